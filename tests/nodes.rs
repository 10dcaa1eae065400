use boltdrive::{query, Node};

mod container;

#[tokio::test]
async fn create_and_read_a_node() {
    let neo4j = container::Neo4jContainer::new().await;
    let graph = neo4j.graph();

    assert!(graph.run(query("RETURN 1")).await.is_ok());

    let mut result = graph
        .execute(
            query("CREATE (friend:Person {name: $name}) RETURN friend").param("name", "Mr Mark"),
        )
        .await
        .unwrap();

    let row = result.next().await.unwrap().expect("one row expected");
    let node: Node = row.get("friend").unwrap();
    let name: String = node.get("name").unwrap();
    assert_eq!(name, "Mr Mark");
    assert_eq!(node.labels(), vec!["Person".to_owned()]);
    assert!(node.id() >= 0);

    assert!(result.next().await.unwrap().is_none());
}
