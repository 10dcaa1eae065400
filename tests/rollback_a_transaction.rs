use boltdrive::query;

mod container;

#[tokio::test]
async fn rolled_back_transaction_leaves_no_trace() {
    let neo4j = container::Neo4jContainer::new().await;
    let graph = neo4j.graph();

    let mut txn = graph.start_txn().await.unwrap();
    txn.run(query("CREATE (p:Person {name: 'Ephemeral'})"))
        .await
        .unwrap();
    txn.rollback().await.unwrap();

    let mut result = graph
        .execute(query("MATCH (p:Person {name: 'Ephemeral'}) RETURN p"))
        .await
        .unwrap();
    assert!(result.next().await.unwrap().is_none());
}

#[tokio::test]
async fn querying_a_failed_transaction_is_rejected() {
    let neo4j = container::Neo4jContainer::new().await;
    let graph = neo4j.graph();

    let mut txn = graph.start_txn().await.unwrap();
    assert!(txn.run(query("NOT VALID CYPHER")).await.is_err());
    assert!(txn.run(query("RETURN 1")).await.is_err());
    assert!(txn.commit().await.is_err());
}
