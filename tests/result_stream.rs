use boltdrive::query;
use serde::Deserialize;

mod container;

#[derive(Debug, Deserialize, PartialEq)]
struct Person {
    name: String,
    age: i64,
}

#[tokio::test]
async fn deserializes_a_row_into_a_struct() {
    let neo4j = container::Neo4jContainer::new().await;
    let graph = neo4j.graph();

    let mut result = graph
        .execute(query("RETURN 'Eve' AS name, 41 AS age"))
        .await
        .unwrap();

    let row = result.next().await.unwrap().expect("one row expected");
    let person: Person = row.to().unwrap();
    assert_eq!(
        person,
        Person {
            name: "Eve".to_owned(),
            age: 41,
        }
    );
}

#[tokio::test]
async fn result_summary_reports_write_counters() {
    let neo4j = container::Neo4jContainer::new().await;
    let graph = neo4j.graph();

    let summary = graph
        .run(query("CREATE (:Person {name: 'Frank'})"))
        .await;
    assert!(summary.is_ok());

    let mut result = graph
        .execute(query("MATCH (p:Person {name: 'Frank'}) SET p.age = 30 RETURN p"))
        .await
        .unwrap();
    let item = result.next_or_summary().await.unwrap();
    assert!(item.row().is_some());

    let item = result.next_or_summary().await.unwrap();
    let summary = item.summary().expect("final item should be the summary");
    assert!(summary.counters().contains_updates());
}
