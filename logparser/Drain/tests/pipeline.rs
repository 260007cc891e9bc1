use std::fs;

use drain::{template_id, DrainConfig, LogParser, ParserConfig};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

const HDFS_FORMAT: &str = "<Date> <Time> <Pid> <Level> <Component>: <Content>";

const HDFS_SAMPLE: &str = "\
081109 203615 148 INFO dfs.DataNode$PacketResponder: PacketResponder 1 for block blk_38865049064139660 terminating
081109 203807 222 INFO dfs.DataNode$PacketResponder: PacketResponder 0 for block blk_-6952295868487656571 terminating
081109 204005 35 INFO dfs.FSNamesystem: BLOCK* NameSystem.addStoredBlock: blockMap updated: 10.251.73.220:50010 is added to blk_7128370237687728475 size 67108864
this line does not follow the format
081109 204015 308 INFO dfs.DataNode$PacketResponder: PacketResponder 2 for block blk_8229193803249955061 terminating
";

fn hdfs_patterns() -> Vec<String> {
    vec![
        r"blk_(|-)[0-9]+".to_string(),
        r"(/|)([0-9]+\.){3}[0-9]+(:[0-9]+|)(:|)".to_string(),
        r"(?<=[^A-Za-z0-9])(\-?\+?\d+)(?=[^A-Za-z0-9])|[0-9]+$".to_string(),
    ]
}

fn read_csv(path: &std::path::Path) -> Vec<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .unwrap();
    reader
        .records()
        .map(|r| r.unwrap().iter().map(str::to_string).collect())
        .collect()
}

#[test]
fn parse_writes_structured_and_template_csv() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    fs::write(root.join("HDFS_2k.log"), HDFS_SAMPLE).unwrap();

    let config = ParserConfig {
        input_dir: root.to_path_buf(),
        output_dir: root.join("result"),
        log_format: HDFS_FORMAT.to_string(),
        preprocess_patterns: hdfs_patterns(),
        keep_parameters: true,
        drain: DrainConfig::new(4, 0.5),
    };
    let mut parser = LogParser::new(&config).unwrap();
    let summary = parser.parse("HDFS_2k.log").unwrap();

    assert_eq!(summary.lines, 4);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.clusters, 2);

    let responder = "PacketResponder <*> for block <*> terminating";
    let stored = "BLOCK* NameSystem.addStoredBlock: blockMap updated: <*> is added to <*> size <*>";

    let templates = read_csv(&summary.templates_path);
    assert_eq!(
        templates,
        vec![
            vec!["EventId", "EventTemplate", "Occurrences"],
            vec![template_id(responder).as_str(), responder, "3"],
            vec![template_id(stored).as_str(), stored, "1"],
        ]
    );

    let structured = read_csv(&summary.structured_path);
    assert_eq!(
        structured[0],
        vec![
            "LineId",
            "Date",
            "Time",
            "Pid",
            "Level",
            "Component",
            "Content",
            "EventId",
            "EventTemplate",
            "ParameterList",
        ]
    );
    assert_eq!(structured.len(), 5);

    let row = &structured[2];
    assert_eq!(row[0], "2");
    assert_eq!(row[1], "081109");
    assert_eq!(row[5], "dfs.DataNode$PacketResponder");
    assert_eq!(row[7], template_id(responder));
    assert_eq!(row[8], responder);
    assert_eq!(row[9], "0, blk_-6952295868487656571");

    let row = &structured[3];
    assert_eq!(row[0], "3");
    assert_eq!(row[8], stored);
    assert_eq!(
        row[9],
        "10.251.73.220:50010, blk_7128370237687728475, 67108864"
    );

    // the unmatched line is dropped, so the last record is LineId 4
    assert_eq!(structured[4][0], "4");
    assert_eq!(structured[4][8], responder);
}

#[test]
fn parse_without_parameters() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    fs::write(root.join("app.log"), "INFO: user 1 login\nINFO: user 2 login\n").unwrap();

    let mut config = ParserConfig::new("<Level>: <Content>");
    config.input_dir = root.to_path_buf();
    config.output_dir = root.join("out");
    config.keep_parameters = false;
    config.drain = DrainConfig::new(4, 0.5);

    let mut parser = LogParser::new(&config).unwrap();
    let summary = parser.parse("app.log").unwrap();

    let structured = read_csv(&summary.structured_path);
    assert_eq!(
        structured[0],
        vec!["LineId", "Level", "Content", "EventId", "EventTemplate"]
    );
    assert_eq!(structured[1][4], "user <*> login");
    assert_eq!(structured[2][4], "user <*> login");
}

#[test]
fn protected_patterns_flow_through_config() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    fs::write(
        root.join("svc.log"),
        "E: start ERR1 done\nE: start ERR2 done\nE: start ERR1 done\n",
    )
    .unwrap();

    let raw = format!(
        r#"
        input_dir = {:?}
        output_dir = {:?}
        log_format = "<Level>: <Content>"

        [drain]
        similarity_threshold = 0.5
        protected_patterns = ['^ERR\d+$']
        "#,
        root.display().to_string(),
        root.join("out").display().to_string(),
    );
    let config = ParserConfig::from_toml_str(&raw).unwrap();

    let mut parser = LogParser::new(&config).unwrap();
    let summary = parser.parse("svc.log").unwrap();
    assert_eq!(summary.clusters, 2);

    let templates = read_csv(&summary.templates_path);
    assert_eq!(templates[1][1], "start ERR1 done");
    assert_eq!(templates[1][2], "2");
    assert_eq!(templates[2][1], "start ERR2 done");
}
