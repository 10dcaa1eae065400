use crate::config::ImpersonateUser;
use crate::connection::{Connection, ConnectionInfo};
use crate::routing::{RoutingTable, Server};
use crate::types::{BoltList, BoltMap, BoltType};
use crate::{Config, Database, Error};
use std::future::Future;
use std::pin::Pin;

pub(crate) trait RoutingTableProvider: Send + Sync {
    fn fetch_routing_table(
        &self,
        bookmarks: &[String],
        db: Option<Database>,
        imp_user: Option<ImpersonateUser>,
    ) -> Pin<Box<dyn Future<Output = Result<RoutingTable, Error>> + Send>>;
}

/// Discovers a cluster's topology by calling `dbms.routing.getRoutingTable` against whatever
/// server the configured URI's initial contact point resolves to.
pub struct ClusterRoutingTableProvider {
    config: Config,
}

impl ClusterRoutingTableProvider {
    pub fn new(config: Config) -> Self {
        ClusterRoutingTableProvider { config }
    }
}

impl RoutingTableProvider for ClusterRoutingTableProvider {
    fn fetch_routing_table(
        &self,
        bookmarks: &[String],
        db: Option<Database>,
        imp_user: Option<ImpersonateUser>,
    ) -> Pin<Box<dyn Future<Output = Result<RoutingTable, Error>> + Send>> {
        let config = self.config.clone();
        let bookmarks = bookmarks.to_vec();
        Box::pin(async move {
            let info = ConnectionInfo::from_config(&config)?;
            let mut connection = Connection::new(&info).await?;

            let mut context = BoltMap::default();
            context.put("address".into(), connection.address().to_owned().into());

            let mut params = BoltMap::default();
            params.put("context".into(), BoltType::Map(context));
            params.put(
                "database".into(),
                match db.as_deref() {
                    Some(db) => db.into(),
                    None => BoltType::Null(Default::default()),
                },
            );

            // Bookmarks and user impersonation aren't yet threaded through this procedure call;
            // the routing table it returns is the same regardless of who's asking.
            let _ = (&bookmarks, &imp_user);

            let records = connection
                .run_to_completion(
                    "CALL dbms.routing.getRoutingTable($context, $database)",
                    params,
                )
                .await?;

            parse_routing_table(records, db)
        })
    }
}

fn parse_routing_table(
    records: Vec<BoltList>,
    db: Option<Database>,
) -> Result<RoutingTable, Error> {
    let row = records.into_iter().next().ok_or_else(|| {
        Error::RoutingTableRefreshFailed("server returned no routing table row".to_owned())
    })?;
    let mut values = row.value.into_iter();

    let ttl: i64 = values
        .next()
        .and_then(|v| i64::try_from(v).ok())
        .ok_or_else(|| Error::RoutingTableRefreshFailed("missing ttl".to_owned()))?;

    let servers_value = values
        .next()
        .ok_or_else(|| Error::RoutingTableRefreshFailed("missing servers".to_owned()))?;
    let servers_list = match servers_value {
        BoltType::List(list) => list,
        other => {
            return Err(Error::RoutingTableRefreshFailed(format!(
                "expected a list of servers, got {other:?}"
            )))
        }
    };

    let mut servers = Vec::with_capacity(servers_list.len());
    for entry in servers_list {
        let map = BoltMap::try_from(entry)?;
        let addresses: Vec<String> = map
            .get::<BoltList>("addresses")
            .ok_or_else(|| {
                Error::RoutingTableRefreshFailed("server entry missing addresses".to_owned())
            })?
            .into_iter()
            .filter_map(|v| String::try_from(v).ok())
            .collect();
        let role: String = map.get("role").ok_or_else(|| {
            Error::RoutingTableRefreshFailed("server entry missing role".to_owned())
        })?;
        servers.push(Server { addresses, role });
    }

    Ok(RoutingTable {
        ttl: ttl.max(0) as u64,
        db,
        servers,
    })
}
