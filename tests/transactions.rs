use boltdrive::query;

mod container;

#[tokio::test]
async fn explicit_transaction_commits() {
    let neo4j = container::Neo4jContainer::new().await;
    let graph = neo4j.graph();

    let mut txn = graph.start_txn().await.unwrap();
    txn.run(query("CREATE (p:Person {name: 'Alice'})"))
        .await
        .unwrap();
    txn.commit().await.unwrap();

    let mut result = graph
        .execute(query("MATCH (p:Person {name: 'Alice'}) RETURN p"))
        .await
        .unwrap();
    assert!(result.next().await.unwrap().is_some());
}

#[tokio::test]
async fn session_write_transaction_retries_and_commits() {
    let neo4j = container::Neo4jContainer::new().await;
    let graph = neo4j.graph();
    let mut session = graph.session(Default::default());

    let counters = session
        .write_transaction(vec![query(
            "CREATE (p:Person {name: 'Bob'})-[:KNOWS]->(q:Person {name: 'Carol'})",
        )])
        .await
        .unwrap();

    assert_eq!(counters.nodes_created(), 2);
    assert_eq!(counters.relationships_created(), 1);
    assert!(session.last_bookmark().is_some());
}

#[tokio::test]
async fn session_read_transaction_returns_a_drivable_stream() {
    let neo4j = container::Neo4jContainer::new().await;
    let graph = neo4j.graph();
    let mut session = graph.session(Default::default());

    session
        .write_transaction(vec![query("CREATE (p:Person {name: 'Dave'})")])
        .await
        .unwrap();

    let (mut txn, mut stream) = session
        .read_transaction(query("MATCH (p:Person {name: 'Dave'}) RETURN p"))
        .await
        .unwrap();

    assert!(stream.next(&mut txn).await.unwrap().is_some());
    txn.commit().await.unwrap();
}

#[tokio::test]
async fn session_run_rejects_while_a_transaction_is_open() {
    let neo4j = container::Neo4jContainer::new().await;
    let graph = neo4j.graph();
    let mut session = graph.session(Default::default());

    session
        .write_transaction(vec![query("CREATE (p:Person {name: 'Eve'})")])
        .await
        .unwrap();

    let (mut txn, mut stream) = session
        .read_transaction(query("MATCH (p:Person {name: 'Eve'}) RETURN p"))
        .await
        .unwrap();

    let err = session
        .run(query("RETURN 1"))
        .await
        .expect_err("run should reject while the session's transaction is still open");
    assert!(matches!(err, boltdrive::Error::ClientError(ref msg)
        if msg == "Queries cannot be run directly on a session with an open transaction"));

    // Once the open transaction ends, the session is usable again.
    assert!(stream.next(&mut txn).await.unwrap().is_some());
    txn.commit().await.unwrap();
    session.run(query("RETURN 1")).await.unwrap();
}
