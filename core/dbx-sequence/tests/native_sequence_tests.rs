// 네이티브 시퀀스 어댑터 테스트 (PostgreSQL, MariaDB)

mod common;

use common::{Reply, ScriptedExecutor};
use dbx_sequence::{
    Dialect, Row, SequenceConfig, SequenceError, SequenceOptions, SequenceResult, Sequences,
};
use sqlparser::ast::Statement;
use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::parser::Parser;

const NOT_YET_DEFINED: &str = "PG::ObjectNotInPrerequisiteState: ERROR:  currval of sequence \
                               \"position\" is not yet defined in this session\n";

fn postgres() -> (Sequences, ScriptedExecutor) {
    let exec = ScriptedExecutor::new();
    (Sequences::connect(exec.clone(), Dialect::Postgres), exec)
}

fn mariadb() -> (Sequences, ScriptedExecutor) {
    let exec = ScriptedExecutor::new();
    (Sequences::connect(exec.clone(), Dialect::MariaDb), exec)
}

// ===== PostgreSQL =====

#[test]
fn test_pg_scenario_a() -> SequenceResult<()> {
    let (seq, exec) = postgres();
    exec.once("SELECT nextval", Reply::value("nextval", 1));
    exec.once("SELECT nextval", Reply::value("nextval", 2));

    seq.create_sequence("position", &SequenceOptions::new())?;
    assert_eq!(seq.nextval("position")?, 1);
    assert_eq!(seq.nextval("position")?, 2);

    assert_eq!(
        exec.log(),
        vec![
            "CREATE SEQUENCE \"position\";",
            "COMMENT ON SEQUENCE \"position\" IS 'created by dbx-sequence';",
            "SELECT nextval('\"position\"') AS nextval;",
            "SELECT nextval('\"position\"') AS nextval;",
        ]
    );
    Ok(())
}

#[test]
fn test_pg_create_reports_ignored_label() -> SequenceResult<()> {
    let (seq, exec) = postgres();
    // 네이티브 시퀀스에는 fiction 컬럼이 없음: 경고만 남기고 생성은 진행
    seq.create_sequence("position", &SequenceOptions::new().with_numeric_label(7))?;

    let warnings = exec.warnings();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("'numeric_label'"));
    assert_eq!(exec.count("CREATE SEQUENCE \"position\";"), 1);
    Ok(())
}

#[test]
fn test_pg_create_sql_parses() -> SequenceResult<()> {
    let (seq, exec) = postgres();
    let opts = SequenceOptions::new()
        .with_if_not_exists(true)
        .with_data_type("bigint")
        .with_increment(2)
        .with_minvalue(1)
        .with_maxvalue(100000)
        .with_start(100)
        .with_cache(10)
        .with_cycle(false)
        .with_owned_by("builders.position");
    seq.create_sequence("position", &opts)?;

    let create = exec.log()[0].clone();
    let statements = Parser::parse_sql(&PostgreSqlDialect {}, &create).expect("valid DDL");
    assert_eq!(statements.len(), 1);
    match &statements[0] {
        Statement::CreateSequence {
            if_not_exists,
            name,
            ..
        } => {
            assert!(*if_not_exists);
            assert_eq!(name.to_string(), "\"position\"");
        }
        other => panic!("expected CREATE SEQUENCE, got {other:?}"),
    }
    assert!(create.contains("START WITH 100"));
    assert!(create.ends_with("NO CYCLE OWNED BY \"builders\".\"position\";"));
    Ok(())
}

#[test]
fn test_pg_step_alias() -> SequenceResult<()> {
    let (seq, exec) = postgres();
    let opts = SequenceOptions::from_json(serde_json::json!({"step": 5, "if_exists": ""}))?;
    seq.create_sequence("position", &opts)?;
    assert_eq!(exec.log()[0], "CREATE SEQUENCE \"position\" INCREMENT BY 5;");
    assert!(exec.warnings().is_empty());
    Ok(())
}

#[test]
fn test_pg_currval_falls_back_once() -> SequenceResult<()> {
    let (seq, exec) = postgres();
    exec.once("SELECT currval", Reply::Fail(NOT_YET_DEFINED.to_string()));
    exec.always("SELECT nextval", Reply::value("nextval", 1));

    assert_eq!(seq.currval("position")?, Some(1));
    assert_eq!(exec.count("SELECT nextval"), 1);

    exec.always("SELECT currval", Reply::value("currval", 1));
    assert_eq!(seq.lastval("position")?, Some(1));
    assert_eq!(exec.count("SELECT nextval"), 1);
    Ok(())
}

#[test]
fn test_pg_currval_fallback_is_bounded() {
    let (seq, exec) = postgres();
    exec.always("SELECT currval", Reply::Fail(NOT_YET_DEFINED.to_string()));
    exec.always(
        "SELECT nextval",
        Reply::Fail("relation \"position\" does not exist".to_string()),
    );

    let err = seq.currval("position").unwrap_err();
    assert!(err.is_missing_table());
    assert_eq!(exec.count("SELECT currval"), 1);
    assert_eq!(exec.count("SELECT nextval"), 1);
}

#[test]
fn test_pg_currval_other_errors_propagate() {
    let (seq, exec) = postgres();
    exec.always("SELECT currval", Reply::Fail("permission denied".to_string()));

    let err = seq.currval("position").unwrap_err();
    assert!(err.to_string().contains("permission denied"));
    assert_eq!(exec.count("SELECT nextval"), 0);
}

#[test]
fn test_pg_setval_is_one_guarded_statement() -> SequenceResult<()> {
    let (seq, exec) = postgres();
    exec.once("setval", Reply::value("setval", 50));
    exec.once("setval", Reply::value("setval", 50));

    assert_eq!(seq.setval("position", 50)?, 50);
    assert_eq!(
        exec.log()[0],
        "SELECT CASE WHEN 50 >= last_value THEN setval('\"position\"', 50) \
         ELSE last_value END AS setval FROM \"position\";"
    );
    assert!(exec.warnings().is_empty());

    // 감소 요청: last_value 그대로
    assert_eq!(seq.setval("position", 3)?, 50);
    assert_eq!(exec.warnings().len(), 1);
    Ok(())
}

#[test]
fn test_pg_custom_sequence() -> SequenceResult<()> {
    let (seq, exec) = postgres();
    exec.always(
        "'\"ours\"'::regclass",
        Reply::Rows(vec![Row::new().with("obj_description", "created by dbx-sequence")]),
    );
    exec.always(
        "'\"theirs\"'::regclass",
        Reply::Rows(vec![Row::new().with("obj_description", "serial for users.id")]),
    );
    exec.always(
        "'\"missing\"'::regclass",
        Reply::Fail("relation \"missing\" does not exist".to_string()),
    );

    assert!(seq.custom_sequence("ours")?);
    assert!(!seq.custom_sequence("theirs")?);
    assert!(!seq.custom_sequence("missing")?);

    let dropped = seq.drop_sequence_if_custom(&["ours", "theirs", "missing"])?;
    assert_eq!(dropped, vec!["ours"]);
    assert_eq!(exec.count("DROP SEQUENCE IF EXISTS \"ours\";"), 1);
    assert_eq!(exec.count("DROP SEQUENCE"), 1);
    Ok(())
}

#[test]
fn test_pg_custom_comment_from_config() -> SequenceResult<()> {
    let exec = ScriptedExecutor::new();
    let config = SequenceConfig::default().with_ownership_comment("owned by app");
    let seq = Sequences::connect_with_config(exec.clone(), Dialect::Postgres, &config);
    exec.always(
        "obj_description",
        Reply::Rows(vec![Row::new().with("obj_description", "owned by app")]),
    );

    seq.create_sequence("position", &SequenceOptions::new())?;
    assert_eq!(exec.log()[1], "COMMENT ON SEQUENCE \"position\" IS 'owned by app';");
    assert!(seq.custom_sequence("position")?);
    Ok(())
}

#[test]
fn test_pg_enumeration_and_drop() -> SequenceResult<()> {
    let (seq, exec) = postgres();
    exec.always(
        "information_schema.sequences",
        Reply::Rows(vec![
            Row::new()
                .with("sequence_catalog", "test")
                .with("sequence_schema", "public")
                .with("sequence_name", "position"),
        ]),
    );
    assert_eq!(seq.sequence_names()?, vec!["position"]);

    seq.drop_sequence("public.position", &SequenceOptions::new().with_if_exists(false))?;
    assert_eq!(exec.count("DROP SEQUENCE \"public\".\"position\";"), 1);
    Ok(())
}

#[test]
fn test_pg_column_default() -> SequenceResult<()> {
    let (seq, exec) = postgres();
    seq.set_column_default_nextval("public.builders", "position", "position_id")?;
    assert_eq!(
        exec.log(),
        vec![
            "ALTER TABLE IF EXISTS \"public\".\"builders\" ALTER COLUMN \"position\" \
             SET DEFAULT nextval('\"position_id\"'::regclass);"
        ]
    );
    Ok(())
}

#[test]
fn test_pg_emulation_only_operations() {
    let (seq, exec) = postgres();
    assert!(seq.delete_to_currval("position").unwrap_err().is_not_supported());
    assert!(
        seq.nextval_with_label("position", 1)
            .unwrap_err()
            .is_not_supported()
    );
    assert!(exec.log().is_empty());
}

// ===== MariaDB =====

#[test]
fn test_mariadb_scenario_b() -> SequenceResult<()> {
    let (seq, exec) = mariadb();
    exec.once("SELECT nextval", Reply::value("nextval", 100));
    exec.once("SELECT nextval", Reply::value("nextval", 101));

    seq.create_sequence("position", &SequenceOptions::new().with_start(100))?;
    assert_eq!(seq.nextval("position")?, 100);
    assert_eq!(seq.nextval("position")?, 101);
    assert_eq!(
        exec.log()[0],
        "CREATE SEQUENCE IF NOT EXISTS `position` START WITH 100 COMMENT = 'created by dbx-sequence';"
    );
    assert_eq!(exec.log()[1], "SELECT nextval(`position`) AS nextval;");
    Ok(())
}

#[test]
fn test_mariadb_owned_by_is_flagged() -> SequenceResult<()> {
    let (seq, exec) = mariadb();
    seq.create_sequence("position", &SequenceOptions::new().with_owned_by("t.c"))?;

    assert!(!exec.log()[0].contains("OWNED BY"));
    let warnings = exec.warnings();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("'owned_by'"));
    Ok(())
}

#[test]
fn test_mariadb_lastval_null_falls_back_once() -> SequenceResult<()> {
    let (seq, exec) = mariadb();
    exec.once("SELECT lastval", Reply::null("lastval"));
    exec.always("SELECT nextval", Reply::value("nextval", 1));

    assert_eq!(seq.currval("position")?, Some(1));
    assert_eq!(exec.count("SELECT lastval"), 1);
    assert_eq!(exec.count("SELECT nextval"), 1);
    Ok(())
}

#[test]
fn test_mariadb_setval_sets_one_below_then_draws() -> SequenceResult<()> {
    let (seq, exec) = mariadb();
    exec.always("SELECT lastval", Reply::value("lastval", 4));
    exec.always("SELECT nextval", Reply::value("nextval", 10));

    assert_eq!(seq.setval("position", 10)?, 10);
    assert_eq!(
        exec.log(),
        vec![
            "SELECT lastval(`position`) AS lastval;",
            "SELECT setval(`position`, 9) AS setval;",
            "SELECT nextval(`position`) AS nextval;",
        ]
    );
    Ok(())
}

#[test]
fn test_mariadb_setval_rejects_decrease() -> SequenceResult<()> {
    let (seq, exec) = mariadb();
    exec.always("SELECT lastval", Reply::value("lastval", 4));

    assert_eq!(seq.setval("position", 1)?, 4);
    assert_eq!(seq.setval("position", 4)?, 4);
    assert_eq!(exec.count("setval("), 0);
    assert_eq!(exec.warnings().len(), 1);
    Ok(())
}

#[test]
fn test_mariadb_enumeration_uses_first_column() -> SequenceResult<()> {
    let (seq, exec) = mariadb();
    exec.always(
        "SHOW FULL TABLES",
        Reply::Rows(vec![
            Row::new()
                .with("Tables_in_test", "alpha")
                .with("Table_type", "SEQUENCE"),
            Row::new()
                .with("Tables_in_test", "beta")
                .with("Table_type", "SEQUENCE"),
        ]),
    );
    assert_eq!(seq.sequence_names()?, vec!["alpha", "beta"]);
    Ok(())
}

#[test]
fn test_mariadb_custom_sequence_reads_table_comment() -> SequenceResult<()> {
    let (seq, exec) = mariadb();
    exec.always(
        "TABLE_NAME = 'c'",
        Reply::Rows(vec![Row::new().with("comment", "created by dbx-sequence")]),
    );

    assert!(seq.custom_sequence("c")?);
    assert!(!seq.custom_sequence("other")?);
    assert!(exec.log()[0].contains("TABLE_SCHEMA = DATABASE()"));

    seq.custom_sequence("shop.c")?;
    assert!(exec.log()[2].contains("TABLE_SCHEMA = 'shop' AND TABLE_NAME = 'c'"));
    Ok(())
}

#[test]
fn test_mariadb_custom_sequence_propagates_errors() {
    let (seq, exec) = mariadb();
    exec.always("information_schema.TABLES", Reply::Fail("Access denied".to_string()));
    let err = seq.custom_sequence("c").unwrap_err();
    assert!(matches!(err, SequenceError::Execution { .. }));
}

#[test]
fn test_mariadb_column_default_and_drop() -> SequenceResult<()> {
    let (seq, exec) = mariadb();
    seq.set_column_default_nextval("builders", "position", "position_id")?;
    seq.drop_sequence("position_id", &SequenceOptions::new())?;
    assert_eq!(
        exec.log(),
        vec![
            "ALTER TABLE IF EXISTS `builders` ALTER COLUMN `position` SET DEFAULT nextval(`position_id`);",
            "DROP SEQUENCE IF EXISTS `position_id`;",
        ]
    );
    Ok(())
}
