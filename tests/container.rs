//! Shared fixture for the integration tests below: either spins up a disposable Neo4j
//! container via `testcontainers-modules`, or points at an externally-managed server when
//! `BOLTDRIVE_TEST_URI` is set (useful in CI environments where Docker-in-Docker is unavailable).

use boltdrive::{ConfigBuilder, Graph};
use testcontainers_modules::{
    neo4j::Neo4j,
    testcontainers::{runners::AsyncRunner, ContainerAsync},
};

pub struct Neo4jContainer {
    graph: Graph,
    _container: Option<ContainerAsync<Neo4j>>,
}

impl Neo4jContainer {
    #[allow(dead_code)]
    pub async fn new() -> Self {
        Self::from_config(ConfigBuilder::default()).await
    }

    pub async fn from_config(config: ConfigBuilder) -> Self {
        let _ = pretty_env_logger::try_init();

        let (uri, user, pass, container) = match std::env::var("BOLTDRIVE_TEST_URI") {
            Ok(uri) => {
                let user = std::env::var("BOLTDRIVE_TEST_USER").unwrap_or_else(|_| "neo4j".into());
                let pass = std::env::var("BOLTDRIVE_TEST_PASS").unwrap_or_else(|_| "neo".into());
                (uri, user, pass, None)
            }
            Err(_) => {
                let container = Neo4j::default()
                    .start()
                    .await
                    .expect("failed to start neo4j container");
                let host_port = container
                    .get_host_port_ipv4(7687)
                    .await
                    .expect("container has no bolt port mapped");
                let uri = format!("bolt://127.0.0.1:{host_port}");
                (uri, "neo4j".to_owned(), "neo".to_owned(), Some(container))
            }
        };

        let config = config.uri(uri).user(user).password(pass).build().unwrap();
        let graph = Graph::connect(config).await.unwrap();

        Self {
            graph,
            _container: container,
        }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }
}
