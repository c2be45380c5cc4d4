//! Pagination protocol tests against a recording executor.

mod common;

use common::{schema, users, MockExecutor, User};
use lifeguard_statement::{Backend, Condition, LifeError, Statement, StatementConfig};

#[test]
fn test_five_records_in_pages_of_two() {
    let schema = schema();
    let executor = MockExecutor::new(users(5));
    let mut statement = Statement::new(&schema, Backend::Postgres);
    statement.from::<User>();
    let mut paginator = statement.paginate::<User, _>(&executor, 2).unwrap();

    let page_1 = paginator.page(1).unwrap();
    assert_eq!(page_1.len(), 2);
    assert_eq!(paginator.total(), 3);
    assert_eq!(paginator.count(), 5);

    assert_eq!(paginator.page(2).unwrap().len(), 2);

    let page_3 = paginator.page(3).unwrap();
    assert_eq!(page_3.len(), 1);
    assert_eq!(page_3[0].id, 5);

    assert_eq!(executor.count_queries(), 1);
    assert_eq!(executor.get_captured_sql().len(), 4);
}

#[test]
fn test_page_windows_are_one_based() {
    let schema = schema();
    let executor = MockExecutor::new(users(7));
    let mut statement = Statement::new(&schema, Backend::Postgres);
    statement.from::<User>();
    let mut paginator = statement.paginate::<User, _>(&executor, 3).unwrap();

    let ids = |page: Vec<User>| page.into_iter().map(|u| u.id).collect::<Vec<_>>();
    assert_eq!(ids(paginator.page(1).unwrap()), vec![1, 2, 3]);
    assert_eq!(ids(paginator.page(3).unwrap()), vec![7]);
    assert_eq!(ids(paginator.page(2).unwrap()), vec![4, 5, 6]);
    assert!(paginator.page(4).unwrap().is_empty());
    assert!(matches!(paginator.page(0), Err(LifeError::PagingError(_))));
}

#[test]
fn test_count_query_keeps_filters_only() {
    let schema = schema();
    let executor = MockExecutor::new(users(4));
    let mut statement = Statement::new(&schema, Backend::Postgres);
    statement
        .from::<User>()
        .where_(Condition::attr("country").eq("US"))
        .limit(1);
    let mut paginator = statement.paginate::<User, _>(&executor, 2).unwrap();
    paginator.page(1).unwrap();

    let sql = executor.get_captured_sql();
    let count = &sql[0];
    assert!(count.contains(r#"WHERE "u"."country_code" = $1"#), "{count}");
    assert!(!count.contains("LIMIT"), "{count}");
    assert!(!count.contains("ORDER BY"), "{count}");
    assert_eq!(executor.get_captured_param_counts(), vec![1, 3]);
}

#[test]
fn test_paginate_requires_target_model() {
    let schema = schema();
    let executor = MockExecutor::new(users(1));
    let statement = Statement::new(&schema, Backend::Postgres);
    assert!(matches!(
        statement.paginate::<User, _>(&executor, 10),
        Err(LifeError::PagingError(_))
    ));
}

#[test]
fn test_default_page_size_from_config() {
    let schema = schema();
    let config = StatementConfig::default();
    let executor = MockExecutor::new(users(45));
    let mut statement = Statement::with_config(&schema, &config);
    statement.from::<User>();
    let mut paginator = statement.paginate_default::<User, _>(&executor).unwrap();
    assert_eq!(paginator.page_size(), config.default_page_size);
    assert_eq!(paginator.page(1).unwrap().len(), 20);
    assert_eq!(paginator.total(), 3);
}

#[test]
fn test_grouped_statement_cannot_be_paginated() {
    let schema = schema();
    let executor = MockExecutor::new(users(3));
    let mut statement = Statement::new(&schema, Backend::Postgres);
    statement.from::<User>().group_by("country");
    assert!(matches!(
        statement.paginate::<User, _>(&executor, 10),
        Err(LifeError::PagingError(_))
    ));
    assert!(executor.get_captured_sql().is_empty());
}

#[test]
fn test_paginators_are_independent() {
    let schema = schema();
    let executor = MockExecutor::new(users(6));
    let mut statement = Statement::new(&schema, Backend::Postgres);
    statement.from::<User>();

    let mut small = statement.paginate::<User, _>(&executor, 2).unwrap();
    let mut large = statement.paginate::<User, _>(&executor, 4).unwrap();
    small.page(1).unwrap();
    large.page(2).unwrap();

    assert_eq!(small.total(), 3);
    assert_eq!(large.total(), 2);
    assert_eq!(small.current_page(), 1);
    assert_eq!(large.current_page(), 2);
    assert_eq!(executor.count_queries(), 2);
}
