//! 条件生成器集成测试

use rat_quicksearch::*;
use std::sync::Arc;

fn users() -> Arc<FieldSet> {
    Arc::new(
        FieldSet::builder("users")
            .add(FieldDescriptor::new("id", FieldType::Integer))
            .add(FieldDescriptor::new("name", FieldType::String))
            .add(FieldDescriptor::new("score", FieldType::Float))
            .add(
                FieldDescriptor::new("birthday", FieldType::Date)
                    .with_value_conversion(Arc::new(AgeDateConversion))
                    .with_field_conversion(Arc::new(AgeDateConversion)),
            )
            .add(FieldDescriptor::new("extra", FieldType::Custom("jsonb".to_string())))
            .build()
            .unwrap(),
    )
}

fn singles(values: &[i64]) -> ValuesBag {
    values
        .iter()
        .fold(ValuesBag::builder(), |b, v| b.add_simple_value(SingleValue::new(*v)))
        .build()
}

fn text(value: &str) -> ValuesBag {
    ValuesBag::builder().add_simple_value(SingleValue::new(value)).build()
}

fn generator(db_type: DatabaseType, group: ValuesGroup) -> SqlConditionGenerator {
    SqlConditionGenerator::for_database(SearchCondition::new(users(), group), db_type)
        .with_mapping(FieldMapping::new("id", "id"))
        .unwrap()
        .with_mapping(FieldMapping::new("name", "name"))
        .unwrap()
        .with_mapping(FieldMapping::new("score", "score"))
        .unwrap()
        .with_mapping(FieldMapping::new("birthday", "birthday"))
        .unwrap()
}

async fn compile(group: ValuesGroup) -> String {
    generator(DatabaseType::SQLite, group).where_clause("").await.unwrap()
}

#[tokio::test]
async fn test_empty_condition_compiles_to_empty_string() {
    let mut generator = generator(DatabaseType::SQLite, ValuesGroup::default());
    assert_eq!(generator.where_clause("WHERE ").await.unwrap(), "");
    assert!(generator.parameters().unwrap().is_empty());
}

#[tokio::test]
async fn test_simple_values_are_ored() {
    let mut generator = generator(DatabaseType::SQLite, ValuesGroup::default().with_field("id", singles(&[1, 2])));
    assert_eq!(
        generator.where_clause("WHERE ").await.unwrap(),
        r#"WHERE (("id" = :id_0 OR "id" = :id_1))"#
    );

    let parameters = generator.parameters().unwrap();
    assert_eq!(parameters.names(), vec!["id_0", "id_1"]);
    let first = parameters.get("id_0").unwrap();
    assert_eq!(first.value, DataValue::Int(1));
    assert_eq!(first.param_type, ParameterType::Integer);
}

#[tokio::test]
async fn test_exclusion_only() {
    let bag = ValuesBag::builder()
        .add_excluded_simple_value(SingleValue::new(5))
        .add_excluded_simple_value(SingleValue::new(6))
        .build();
    assert_eq!(
        compile(ValuesGroup::default().with_field("id", bag)).await,
        r#"(("id" <> :id_0 AND "id" <> :id_1))"#
    );
}

#[tokio::test]
async fn test_inclusion_and_exclusion() {
    let bag = ValuesBag::builder()
        .add_simple_value(SingleValue::new(1))
        .add_excluded_simple_value(SingleValue::new(5))
        .build();
    assert_eq!(
        compile(ValuesGroup::default().with_field("id", bag)).await,
        r#"((("id" = :id_0) AND "id" <> :id_1))"#
    );
}

#[tokio::test]
async fn test_range_templates() {
    let cases = [
        ((true, true), r#"("id" >= :id_0 AND "id" <= :id_1)"#),
        ((true, false), r#"("id" >= :id_0 AND "id" < :id_1)"#),
        ((false, true), r#"("id" > :id_0 AND "id" <= :id_1)"#),
        ((false, false), r#"("id" > :id_0 AND "id" < :id_1)"#),
    ];
    for ((lower, upper), expected) in cases {
        let bag = ValuesBag::builder().add_range(Range::new(1, 10, lower, upper)).build();
        let sql = compile(ValuesGroup::default().with_field("id", bag)).await;
        assert_eq!(sql, format!("(({}))", expected));
    }
}

#[tokio::test]
async fn test_excluded_range_is_complement() {
    let cases = [
        ((true, true), r#"("id" < :id_0 OR "id" > :id_1)"#),
        ((true, false), r#"("id" < :id_0 OR "id" >= :id_1)"#),
        ((false, true), r#"("id" <= :id_0 OR "id" > :id_1)"#),
        ((false, false), r#"("id" <= :id_0 OR "id" >= :id_1)"#),
    ];
    for ((lower, upper), expected) in cases {
        let bag = ValuesBag::builder()
            .add_excluded_range(Range::new(1, 10, lower, upper))
            .build();
        let sql = compile(ValuesGroup::default().with_field("id", bag)).await;
        assert_eq!(sql, format!("(({}))", expected));
    }
}

#[tokio::test]
async fn test_comparisons() {
    let bag = ValuesBag::builder()
        .add_comparison(Compare::new(5, CompareOperator::Greater))
        .add_comparison(Compare::new(10, CompareOperator::Lower))
        .add_comparison(Compare::new(7, CompareOperator::NotEqual))
        .build();
    assert_eq!(
        compile(ValuesGroup::default().with_field("id", bag)).await,
        r#"(((("id" > :id_0 AND "id" < :id_1)) AND "id" <> :id_2))"#
    );
}

#[tokio::test]
async fn test_group_logical_operator() {
    let and_group = ValuesGroup::new(GroupLogical::And)
        .with_field("id", singles(&[1]))
        .with_field("name", text("bob"));
    assert_eq!(
        compile(and_group).await,
        r#"(("id" = :id_0) AND ("name" = :name_0))"#
    );

    let or_group = ValuesGroup::new(GroupLogical::Or)
        .with_field("id", singles(&[1]))
        .with_field("name", text("bob"));
    assert_eq!(
        compile(or_group).await,
        r#"(("id" = :id_0) OR ("name" = :name_0))"#
    );
}

#[tokio::test]
async fn test_subgroups_are_ored_and_anded_with_fields() {
    let group = ValuesGroup::default()
        .with_field("id", singles(&[1]))
        .with_group(ValuesGroup::default().with_field("name", text("a")))
        .with_group(ValuesGroup::default().with_field("name", text("b")));
    assert_eq!(
        compile(group).await,
        r#"(("id" = :id_0)) AND ((("name" = :name_0)) OR (("name" = :name_1)))"#
    );
}

#[tokio::test]
async fn test_only_subgroups() {
    let group = ValuesGroup::default().with_group(ValuesGroup::default().with_field("id", singles(&[3])));
    assert_eq!(compile(group).await, r#"((("id" = :id_0)))"#);
}

#[tokio::test]
async fn test_primary_condition_comes_first() {
    let condition = SearchCondition::new(users(), ValuesGroup::default().with_field("name", text("x")))
        .with_primary_condition(SearchPrimaryCondition::new(
            ValuesGroup::default().with_field("id", singles(&[9])),
        ));
    let mut generator = SqlConditionGenerator::for_database(condition, DatabaseType::SQLite)
        .with_mapping(FieldMapping::new("id", "id"))
        .unwrap()
        .with_mapping(FieldMapping::new("name", "name"))
        .unwrap();

    assert_eq!(
        generator.where_clause("").await.unwrap(),
        r#"(("id" = :id_0)) AND (("name" = :name_0))"#
    );
    assert_eq!(generator.parameters().unwrap().names(), vec!["id_0", "name_0"]);
}

#[tokio::test]
async fn test_primary_condition_alone_is_wrapped() {
    let condition = SearchCondition::new(users(), ValuesGroup::default()).with_primary_condition(
        SearchPrimaryCondition::new(ValuesGroup::default().with_field("id", singles(&[9]))),
    );
    let mut generator = SqlConditionGenerator::for_database(condition, DatabaseType::SQLite)
        .with_mapping(FieldMapping::new("id", "id"))
        .unwrap();
    assert_eq!(generator.where_clause("").await.unwrap(), r#"((("id" = :id_0)))"#);
}

#[tokio::test]
async fn test_where_clause_is_idempotent() {
    let mut generator = generator(DatabaseType::MySQL, ValuesGroup::default().with_field("id", singles(&[1, 2])));
    let first = generator.where_clause("WHERE ").await.unwrap();
    let params = generator.parameters().unwrap().clone();
    let second = generator.where_clause("WHERE ").await.unwrap();
    assert_eq!(first, second);
    assert_eq!(&params, generator.parameters().unwrap());
    assert_eq!(first, "WHERE ((`id` = :id_0 OR `id` = :id_1))");
}

#[tokio::test]
async fn test_fresh_instances_compile_identically() {
    let birthdays = ValuesBag::builder()
        .add_simple_value(SingleValue::new(30))
        .add_simple_value(SingleValue::new("2000-01-01"))
        .build();
    let group = ValuesGroup::default()
        .with_field("id", singles(&[1, 2]))
        .with_field("birthday", birthdays)
        .with_group(
            ValuesGroup::new(GroupLogical::Or)
                .with_field("name", text("a"))
                .with_field("id", singles(&[3])),
        );

    let mut first = generator(DatabaseType::MySQL, group.clone());
    let mut second = generator(DatabaseType::MySQL, group);
    let first_clause = first.where_clause("WHERE ").await.unwrap();
    let second_clause = second.where_clause("WHERE ").await.unwrap();

    assert_eq!(first_clause, second_clause);
    assert_eq!(first.parameters().unwrap(), second.parameters().unwrap());
    assert_eq!(
        first.parameters().unwrap().names(),
        vec!["id_0", "id_1", "birthday_0", "birthday_1", "name_0", "id_2"]
    );
    assert!(first_clause.contains("TIMESTAMPDIFF(YEAR, `birthday`, CURDATE()) = :birthday_0"));
}

#[tokio::test]
async fn test_parameters_before_compile_fails() {
    let generator = generator(DatabaseType::SQLite, ValuesGroup::default());
    assert!(matches!(
        generator.parameters(),
        Err(QuickSearchError::BadMethodCall { .. })
    ));
}

#[tokio::test]
async fn test_configure_after_compile_fails() {
    let mut generator = generator(DatabaseType::SQLite, ValuesGroup::default().with_field("id", singles(&[1])));
    generator.where_clause("").await.unwrap();
    assert!(generator.is_compiled());
    assert!(matches!(
        generator.configure(FieldMapping::new("name", "full_name")),
        Err(QuickSearchError::BadMethodCall { .. })
    ));
}

#[tokio::test]
async fn test_unknown_field_in_mapping_or_tree() {
    let mut generator = SqlConditionGenerator::for_database(
        SearchCondition::new(users(), ValuesGroup::default()),
        DatabaseType::SQLite,
    );
    assert!(matches!(
        generator.configure(FieldMapping::new("missing", "missing")),
        Err(QuickSearchError::UnknownField { .. })
    ));

    let mut generator = generator_with_tree(ValuesGroup::default().with_field("missing", singles(&[1])));
    assert!(matches!(
        generator.where_clause("").await,
        Err(QuickSearchError::UnknownField { .. })
    ));
}

fn generator_with_tree(group: ValuesGroup) -> SqlConditionGenerator {
    generator(DatabaseType::SQLite, group)
}

#[tokio::test]
async fn test_unmapped_field_is_skipped() {
    let mut generator = SqlConditionGenerator::for_database(
        SearchCondition::new(
            users(),
            ValuesGroup::default()
                .with_field("id", singles(&[1]))
                .with_field("name", text("x")),
        ),
        DatabaseType::SQLite,
    )
    .with_mapping(FieldMapping::new("id", "id"))
    .unwrap();
    assert_eq!(generator.where_clause("").await.unwrap(), r#"(("id" = :id_0))"#);
}

#[tokio::test]
async fn test_custom_type_without_db_type_is_configuration_error() {
    let mut generator = SqlConditionGenerator::for_database(
        SearchCondition::new(users(), ValuesGroup::default().with_field("extra", text("x"))),
        DatabaseType::PostgreSQL,
    )
    .with_mapping(FieldMapping::new("extra", "extra"))
    .unwrap();
    assert!(matches!(
        generator.where_clause("").await,
        Err(QuickSearchError::ConfigError { .. })
    ));

    let mut generator = SqlConditionGenerator::for_database(
        SearchCondition::new(users(), ValuesGroup::default().with_field("extra", text("x"))),
        DatabaseType::PostgreSQL,
    )
    .with_mapping(FieldMapping::new("extra", "extra").db_type(ParameterType::String))
    .unwrap();
    assert_eq!(generator.where_clause("").await.unwrap(), r#"(("extra" = :extra_0))"#);
}

#[tokio::test]
async fn test_failed_compile_is_terminal() {
    let mut generator = SqlConditionGenerator::for_database(
        SearchCondition::new(users(), ValuesGroup::default().with_field("extra", text("x"))),
        DatabaseType::PostgreSQL,
    )
    .with_mapping(FieldMapping::new("extra", "extra"))
    .unwrap();
    assert!(matches!(
        generator.where_clause("").await,
        Err(QuickSearchError::ConfigError { .. })
    ));

    assert!(!generator.is_compiled());
    assert!(matches!(
        generator.configure(FieldMapping::new("id", "id")),
        Err(QuickSearchError::BadMethodCall { .. })
    ));
    assert!(matches!(
        generator.where_clause("").await,
        Err(QuickSearchError::BadMethodCall { .. })
    ));
    assert!(matches!(
        generator.parameters(),
        Err(QuickSearchError::BadMethodCall { .. })
    ));
}

#[tokio::test]
async fn test_unsafe_mapping_target_is_rejected() {
    let mut generator = SqlConditionGenerator::for_database(
        SearchCondition::new(users(), ValuesGroup::default().with_field("id", singles(&[1]))),
        DatabaseType::SQLite,
    )
    .with_mapping(FieldMapping::new("id", "id; DROP TABLE users"))
    .unwrap();
    assert!(matches!(
        generator.where_clause("").await,
        Err(QuickSearchError::ValidationError { .. })
    ));
}

#[tokio::test]
async fn test_table_alias_in_mapping() {
    let mut generator = SqlConditionGenerator::for_database(
        SearchCondition::new(users(), ValuesGroup::default().with_field("id", singles(&[1]))),
        DatabaseType::PostgreSQL,
    )
    .with_mapping(FieldMapping::new("id", "u.id"))
    .unwrap();
    assert_eq!(generator.where_clause("").await.unwrap(), r#"(("u"."id" = :id_0))"#);
}

#[tokio::test]
async fn test_like_patterns_are_escaped() {
    let bag = ValuesBag::builder()
        .add_pattern_match(PatternMatch::new("50%_x", PatternMatchType::Contains, false))
        .build();
    let mut generator = generator(DatabaseType::SQLite, ValuesGroup::default().with_field("name", bag));
    assert_eq!(
        generator.where_clause("").await.unwrap(),
        r#"(("name" LIKE :name_0 ESCAPE '\'))"#
    );
    assert_eq!(
        generator.parameters().unwrap().get("name_0").unwrap().value,
        DataValue::from(r"%50\%\_x%")
    );
}

#[tokio::test]
async fn test_case_insensitive_and_negated_patterns() {
    let bag = ValuesBag::builder()
        .add_pattern_match(PatternMatch::new("Bo", PatternMatchType::StartsWith, true))
        .add_pattern_match(PatternMatch::new("^x", PatternMatchType::NotRegex, true))
        .build();
    let mut generator = generator(DatabaseType::PostgreSQL, ValuesGroup::default().with_field("name", bag));
    assert_eq!(
        generator.where_clause("").await.unwrap(),
        r#"(((LOWER("name") LIKE LOWER(:name_0)) AND "name" !~* :name_1))"#
    );
    let parameters = generator.parameters().unwrap();
    assert_eq!(parameters.get("name_0").unwrap().value, DataValue::from("Bo%"));
    assert_eq!(parameters.get("name_1").unwrap().value, DataValue::from("^x"));
}

#[tokio::test]
async fn test_mysql_case_insensitive_regex() {
    let bag = ValuesBag::builder()
        .add_pattern_match(PatternMatch::new("^a", PatternMatchType::Regex, true))
        .build();
    let mut generator = generator(DatabaseType::MySQL, ValuesGroup::default().with_field("name", bag));
    assert_eq!(
        generator.where_clause("").await.unwrap(),
        "((REGEXP_LIKE(`name`, :name_0, 'i') = 1))"
    );
}

#[tokio::test]
async fn test_sqlite_case_insensitive_regex_uses_lower() {
    let bag = ValuesBag::builder()
        .add_pattern_match(PatternMatch::new("^a", PatternMatchType::Regex, true))
        .build();
    let mut generator = generator(DatabaseType::SQLite, ValuesGroup::default().with_field("name", bag));
    assert_eq!(
        generator.where_clause("").await.unwrap(),
        r#"((LOWER("name") REGEXP LOWER(:name_0)))"#
    );
}

#[tokio::test]
async fn test_conversion_strategy_selects_column_expression() {
    let bag = ValuesBag::builder()
        .add_simple_value(SingleValue::new(30))
        .add_simple_value(SingleValue::new("2000-01-01"))
        .build();
    let mut generator = generator(DatabaseType::MySQL, ValuesGroup::default().with_field("birthday", bag));
    assert_eq!(
        generator.where_clause("").await.unwrap(),
        "((TIMESTAMPDIFF(YEAR, `birthday`, CURDATE()) = :birthday_0 OR `birthday` = :birthday_1))"
    );

    let parameters = generator.parameters().unwrap();
    assert_eq!(parameters.get("birthday_0").unwrap().param_type, ParameterType::Integer);
    let date = parameters.get("birthday_1").unwrap();
    assert_eq!(date.param_type, ParameterType::Date);
    assert_eq!(
        date.value,
        DataValue::Date(chrono::NaiveDate::from_ymd_opt(2000, 1, 1).unwrap())
    );
}

#[tokio::test]
async fn test_failed_value_conversion_is_reported() {
    let bag = ValuesBag::builder().add_simple_value(SingleValue::new("not a date")).build();
    let mut generator = generator(DatabaseType::SQLite, ValuesGroup::default().with_field("birthday", bag));
    assert!(matches!(
        generator.where_clause("").await,
        Err(QuickSearchError::TransformationFailed { .. })
    ));
}

#[tokio::test]
async fn test_embedded_cast_value() {
    let cast = Arc::new(CastConversion::new("decimal(10, 2)").unwrap().embedded());
    let mut generator = SqlConditionGenerator::for_database(
        SearchCondition::new(
            users(),
            ValuesGroup::default().with_field(
                "score",
                ValuesBag::builder().add_simple_value(SingleValue::new(1.5)).build(),
            ),
        ),
        DatabaseType::SQLite,
    )
    .with_mapping(FieldMapping::new("score", "score").value_conversion(cast))
    .unwrap();

    assert_eq!(
        generator.where_clause("").await.unwrap(),
        r#"(("score" = CAST(1.5 AS DECIMAL(10, 2))))"#
    );
    assert!(generator.parameters().unwrap().is_empty());
}

#[tokio::test]
async fn test_bound_cast_value_and_lowered_column() {
    let cast = Arc::new(CastConversion::new("TEXT").unwrap());
    let lower = Arc::new(LowerCaseConversion);
    let mut generator = SqlConditionGenerator::for_database(
        SearchCondition::new(
            users(),
            ValuesGroup::default()
                .with_field("id", singles(&[7]))
                .with_field("name", text("BoB")),
        ),
        DatabaseType::PostgreSQL,
    )
    .with_mapping(FieldMapping::new("id", "id").value_conversion(cast))
    .unwrap()
    .with_mapping(
        FieldMapping::new("name", "name")
            .value_conversion(lower.clone())
            .field_conversion(lower),
    )
    .unwrap();

    assert_eq!(
        generator.where_clause("").await.unwrap(),
        r#"(("id" = CAST(:id_0 AS TEXT)) AND (LOWER("name") = :name_0))"#
    );
    assert_eq!(
        generator.parameters().unwrap().get("name_0").unwrap().value,
        DataValue::from("bob")
    );
}

#[tokio::test]
async fn test_update_query_applies_once() {
    let mut generator = generator(DatabaseType::PostgreSQL, ValuesGroup::default().with_field("id", singles(&[1, 2])));
    let mut query = SqlQueryBuilder::new(DatabaseType::PostgreSQL).from("users");

    assert!(generator.update_query(&mut query).await.unwrap());
    assert!(!generator.update_query(&mut query).await.unwrap());
    assert_eq!(query.where_clauses().len(), 1);

    let (sql, values) = query.build_positional().unwrap();
    assert_eq!(sql, r#"SELECT * FROM "users" WHERE (("id" = $1 OR "id" = $2))"#);
    assert_eq!(values, vec![DataValue::Int(1), DataValue::Int(2)]);
}

#[tokio::test]
async fn test_update_query_with_empty_condition_leaves_query_untouched() {
    let mut generator = generator(DatabaseType::SQLite, ValuesGroup::default());
    let mut query = SqlQueryBuilder::new(DatabaseType::SQLite).from("users");
    assert!(generator.update_query(&mut query).await.unwrap());
    assert!(query.where_clauses().is_empty());
    assert_eq!(query.build().unwrap().0, r#"SELECT * FROM "users""#);
}

#[tokio::test]
async fn test_factory_applies_default_alias() {
    let condition = SearchCondition::new(users(), ValuesGroup::default().with_field("id", singles(&[1])));
    let mut generator = create_condition_generator(condition, DatabaseType::MySQL, Some("u"));
    generator.configure(FieldMapping::new("id", "id")).unwrap();
    assert_eq!(generator.where_clause("").await.unwrap(), "((`u`.`id` = :id_0))");
    assert_eq!(generator.field_mappings().len(), 1);
}
