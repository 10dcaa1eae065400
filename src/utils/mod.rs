pub(crate) mod concurrent_hashmap;

pub(crate) use concurrent_hashmap::ConcurrentHashMap;
