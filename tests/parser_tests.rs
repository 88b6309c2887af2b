use apex_log_trace::parser::extractors::{
    extract_line_number, extract_object, extract_rows, extract_timestamp,
};
use apex_log_trace::parser::{ApexLogParser, NodeKind, ParsedLog, TreeNode};
use apex_log_trace::utils::config::round3;
use apex_log_trace::utils::ParseError;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::io::Write;
use tempfile::NamedTempFile;

fn parse(text: &str) -> ParsedLog {
    ApexLogParser::new().parse_str("test.log", text)
}

fn walk<'a>(node: &'a TreeNode, out: &mut Vec<&'a TreeNode>) {
    for child in &node.children {
        out.push(child);
        walk(child, out);
    }
}

const NESTED_LOG: &str = "\
43.0 APEX_CODE,FINEST;APEX_PROFILING,INFO
07:29:05.000 (1000000)|USER_INFO|[EXTERNAL]|005xx000001Sv6a|dev@example.com|(GMT-08:00) Pacific Standard Time|GMT-08:00
07:29:05.001 (1100000)|CODE_UNIT_STARTED|[EXTERNAL]|execute_anonymous_apex
07:29:05.001 (1200000)|METHOD_ENTRY|[1]|01pxx0000000001|AccountService.load()
07:29:05.001 (1300000)|SOQL_EXECUTE_BEGIN|[4]|Aggregations:0|SELECT Id, Name FROM Account WHERE Name = 'x'
07:29:05.002 (2300000)|SOQL_EXECUTE_END|[4]|Rows:3
07:29:05.002 (2400000)|DML_BEGIN|[9]|Op:Update|Type:Account|Rows:3
07:29:05.004 (4400000)|DML_END|[9]
07:29:05.005 (5000000)|METHOD_EXIT|[1]|01pxx0000000001|AccountService.load()
07:29:05.006 (6000000)|CODE_UNIT_FINISHED|execute_anonymous_apex
";

#[test]
fn test_extract_timestamp() {
    assert_eq!(extract_timestamp("07:29:05.123 (813678225)"), 813.678225);
    assert_eq!(extract_timestamp("07:29:05.123"), 0.0);
}

#[test]
fn test_extract_line_number() {
    assert_eq!(extract_line_number("[12]"), 12);
    assert_eq!(extract_line_number("no-brackets"), 0);
}

#[test]
fn test_extract_object() {
    assert_eq!(extract_object("SELECT Id FROM Account WHERE Id = '1'"), "Account");
    assert_eq!(extract_object(""), "");
}

#[test]
fn test_extract_rows() {
    assert_eq!(extract_rows("Rows:5"), 5);
    assert_eq!(extract_rows("garbage"), 0);
}

#[test]
fn test_well_nested_log_closes_every_node() {
    let log = parse(NESTED_LOG);

    let mut nodes = Vec::new();
    walk(&log.tree, &mut nodes);

    assert_eq!(nodes.len(), 4);
    for node in nodes {
        let duration = node.duration.expect("closed node has a duration");
        assert!(duration >= 0.0, "negative duration on {:?}", node.kind);
        assert!(node.time_end.is_some());
    }
    assert!(log.tree.duration.is_none());
    assert!(log.tree.time_start.is_none());
}

#[test]
fn test_nested_log_shape() {
    let log = parse(NESTED_LOG);

    assert_eq!(log.user.as_deref(), Some("dev@example.com"));
    assert_eq!(log.meta.duration_ms, 4.9);

    let unit = &log.tree.children[0];
    assert_eq!(
        unit.kind,
        NodeKind::CodeUnit {
            name: "execute_anonymous_apex".to_string()
        }
    );
    assert_eq!(unit.duration, Some(4.9));

    let method = &unit.children[0];
    assert_eq!(
        method.kind,
        NodeKind::Method {
            line_number: 1,
            method: "AccountService.load()".to_string()
        }
    );
    assert_eq!(method.children.len(), 2);

    assert_eq!(
        method.children[0].kind,
        NodeKind::Soql {
            query: "SELECT Id, Name FROM Account WHERE Name = 'x'".to_string(),
            object: "Account".to_string(),
            rows: Some(3),
        }
    );
    assert_eq!(method.children[0].duration, Some(1.0));

    assert_eq!(
        method.children[1].kind,
        NodeKind::Dml {
            line_number: 9,
            operation: "Update".to_string(),
            object: "Account".to_string(),
            rows: 3,
        }
    );
    assert_eq!(method.children[1].duration, Some(2.0));
}

#[test]
fn test_single_code_unit() {
    let log = parse(
        "07:00:00.001 (1000000)|CODE_UNIT_STARTED|[EXTERNAL]|execute_anonymous_apex\n\
         07:00:00.003 (3000000)|CODE_UNIT_FINISHED|execute_anonymous_apex\n",
    );

    assert_eq!(log.tree.children.len(), 1);
    let unit = &log.tree.children[0];
    assert!(matches!(unit.kind, NodeKind::CodeUnit { .. }));
    assert_eq!(unit.time_start, Some(1.0));
    assert_eq!(unit.time_end, Some(3.0));
    assert_eq!(unit.duration, Some(2.0));
    assert!(unit.children.is_empty());
}

#[test]
fn test_unmatched_exit_leaves_root_untouched() {
    let log = parse("07:00:00.003 (3000000)|METHOD_EXIT|[1]|01p|Foo.bar()\n");

    assert_eq!(log.tree, TreeNode::root());
}

#[test]
fn test_orphan_exit_does_not_stop_later_events() {
    let log = parse(
        "t (1000000)|CODE_UNIT_FINISHED|stray\n\
         t (2000000)|CODE_UNIT_STARTED|[EXTERNAL]|later\n\
         t (4000000)|CODE_UNIT_FINISHED|later\n",
    );

    assert_eq!(log.tree.children.len(), 1);
    assert_eq!(log.tree.children[0].duration, Some(2.0));
}

#[test]
fn test_duration_law() {
    let pairs = [
        (813678225u64, 813679225u64),
        (0, 0),
        (1, 2_000_001),
        (123_456_789, 987_654_321),
        (5_000_000, 5_000_500),
    ];

    for (start, end) in pairs {
        let text = format!(
            "a ({})|METHOD_ENTRY|[2]|01p|A.b()\nb ({})|METHOD_EXIT|[2]|01p|A.b()\n",
            start, end
        );
        let log = parse(&text);
        let t0 = extract_timestamp(&format!("a ({})", start));
        let t1 = extract_timestamp(&format!("b ({})", end));

        assert_eq!(log.tree.children[0].duration, Some(round3(t1 - t0)));
    }
}

#[test]
fn test_truncated_log_keeps_open_nodes() {
    let log = parse(
        "t (1000000)|CODE_UNIT_STARTED|[EXTERNAL]|trigger\n\
         t (2000000)|METHOD_ENTRY|[3]|01p|A.first()\n\
         t (3000000)|METHOD_EXIT|[3]|01p|A.first()\n\
         t (4000000)|METHOD_ENTRY|[5]|01p|A.second()\n",
    );

    let unit = &log.tree.children[0];
    assert!(unit.duration.is_none());
    assert_eq!(unit.children.len(), 2);
    assert_eq!(unit.children[0].duration, Some(1.0));
    assert!(unit.children[1].duration.is_none());
    assert_eq!(unit.children[1].time_start, Some(4.0));
}

#[test]
fn test_noise_lines_are_ignored() {
    let log = parse(
        "43.0 APEX_CODE,FINEST\n\
         \n\
         Execute Anonymous: System.debug('x');\n\
         t (1000000)|HEAP_ALLOCATE|[72]|Bytes:3\n\
         t (1000000)|STATEMENT_EXECUTE|[1]\n",
    );

    assert_eq!(log.tree, TreeNode::root());
    assert!(log.limits.is_empty());
    assert!(log.user.is_none());
}

#[test]
fn test_limit_usage_and_exception() {
    let log = parse(
        "t (1000000)|CODE_UNIT_STARTED|[EXTERNAL]|unit\n\
         t (1500000)|LIMIT_USAGE|[4]|SOQL|2|100\n\
         t (1600000)|LIMIT_USAGE|[4]|SOQL|3|100\n\
         t (1700000)|LIMIT_USAGE|[6]|DML|1|150\n\
         t (1800000)|EXCEPTION_THROWN|[7]|System.NullPointerException: Attempt to de-reference a null object\n\
         t (2000000)|CODE_UNIT_FINISHED|unit\n",
    );

    assert_eq!(log.limits.len(), 2);
    assert_eq!(log.limits["SOQL"].used, 3);
    assert_eq!(log.limits["SOQL"].max, 100);
    assert_eq!(log.limits["DML"].used, 1);

    let unit = &log.tree.children[0];
    assert_eq!(unit.duration, Some(1.0));
    let exception = &unit.children[0];
    assert_eq!(
        exception.kind,
        NodeKind::Exception {
            message: "System.NullPointerException: Attempt to de-reference a null object"
                .to_string()
        }
    );
    assert!(exception.duration.is_none());
}

#[test]
fn test_exception_message_keeps_pipes() {
    let log = parse(
        "t (1000000)|CODE_UNIT_STARTED|[EXTERNAL]|unit\n\
         t (1800000)|EXCEPTION_THROWN|[7]|System.StringException: Invalid id: a|b|c\n\
         t (2000000)|CODE_UNIT_FINISHED|unit\n",
    );

    let exception = &log.tree.children[0].children[0];
    assert_eq!(
        exception.kind,
        NodeKind::Exception {
            message: "System.StringException: Invalid id: a|b|c".to_string()
        }
    );
}

#[test]
fn test_overall_duration_spans_top_level_nodes() {
    let log = parse(
        "t (1000000)|CODE_UNIT_STARTED|[EXTERNAL]|first\n\
         t (2000000)|CODE_UNIT_FINISHED|first\n\
         t (3000000)|CODE_UNIT_STARTED|[EXTERNAL]|second\n\
         t (9000000)|CODE_UNIT_FINISHED|second\n",
    );
    assert_eq!(log.meta.duration_ms, 8.0);
}

#[test]
fn test_overall_duration_zero_when_nothing_closed() {
    let log = parse("t (1000000)|CODE_UNIT_STARTED|[EXTERNAL]|x\n");
    assert_eq!(log.meta.duration_ms, 0.0);
}

#[test]
fn test_json_shape() {
    let log = parse(
        "t (1000000)|CODE_UNIT_STARTED|[EXTERNAL]|execute_anonymous_apex\n\
         t (3000000)|CODE_UNIT_FINISHED|execute_anonymous_apex\n",
    );

    assert_eq!(
        serde_json::to_value(&log).unwrap(),
        json!({
            "meta": { "filename": "test.log", "durationMs": 2.0 },
            "limits": {},
            "tree": {
                "type": "ROOT",
                "children": [{
                    "type": "CODE UNIT",
                    "name": "execute_anonymous_apex",
                    "timeStart": 1.0,
                    "timeEnd": 3.0,
                    "duration": 2.0
                }]
            }
        })
    );
}

#[test]
fn test_parse_file_streams_crlf() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        "t (1000000)|CODE_UNIT_STARTED|[EXTERNAL]|unit\r\nt (2000000)|CODE_UNIT_FINISHED|unit\r\n"
    )
    .unwrap();

    let log = ApexLogParser::new().parse_file(file.path()).unwrap();

    let expected_name = file.path().file_name().unwrap().to_string_lossy().into_owned();
    assert_eq!(log.meta.filename, expected_name);
    assert_eq!(
        log.tree.children[0].kind,
        NodeKind::CodeUnit {
            name: "unit".to_string()
        }
    );
    assert_eq!(log.tree.children[0].duration, Some(1.0));
}

#[test]
fn test_parse_file_missing() {
    let dir = tempfile::tempdir().unwrap();
    let err = ApexLogParser::new()
        .parse_file(dir.path().join("missing.log"))
        .unwrap_err();

    assert!(matches!(err, ParseError::NotFound(_)));
}

#[test]
fn test_parse_file_empty_path() {
    let err = ApexLogParser::new().parse_file("").unwrap_err();
    assert!(matches!(err, ParseError::InvalidArgument(_)));
}

#[test]
fn test_parser_reuse_is_isolated() {
    let mut parser = ApexLogParser::new();
    let first = parser.parse_str("a.log", NESTED_LOG);
    let second = parser.parse_str("b.log", "t (1)|METHOD_EXIT|[1]|x\n");

    assert!(first.user.is_some());
    assert!(second.user.is_none());
    assert_eq!(second.tree, TreeNode::root());
    assert_eq!(second.meta.duration_ms, 0.0);
}
