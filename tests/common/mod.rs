use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub struct TestEnv {
    _tmp: TempDir,
    pub data_dir: PathBuf,
    pub out_dir: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let data_dir = tmp.path().join("export");
        let out_dir = tmp.path().join("out");
        fs::create_dir_all(&data_dir).expect("create export dir");
        fs::create_dir_all(&out_dir).expect("create output dir");

        write_tables(&data_dir, &fixture_tables());

        Self {
            _tmp: tmp,
            data_dir,
            out_dir,
        }
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("qdd");
        cmd.env("NO_COLOR", "1").env("RUST_LOG", "warn");
        cmd
    }

    pub fn model_path(&self) -> PathBuf {
        self.out_dir.join("qdd.json")
    }

    /// Imports the fixture export and returns the written model path.
    pub fn import(&self) -> PathBuf {
        let model = self.model_path();
        self.cmd()
            .arg("import")
            .arg("--data-dir")
            .arg(&self.data_dir)
            .arg("--output")
            .arg(&model)
            .assert()
            .success();
        model
    }

    pub fn overwrite_table(&self, table: &str, rows: Value) {
        write_json(&self.data_dir.join(format!("{table}.json")), &rows);
    }
}

pub fn read_json(path: &Path) -> Value {
    let raw = fs::read_to_string(path).expect("read json file");
    serde_json::from_str(&raw).expect("valid json file")
}

fn write_json(path: &Path, value: &Value) {
    fs::write(path, serde_json::to_vec_pretty(value).expect("serialize fixture"))
        .expect("write fixture table");
}

fn write_tables(dir: &Path, tables: &Value) {
    let tables = tables.as_object().expect("fixture tables object");
    for (name, rows) in tables {
        write_json(&dir.join(format!("{name}.json")), rows);
    }
}

pub fn fixture_tables() -> Value {
    json!({
        "attributes": {
            "Elements": [
                {"AttributeID": "a-q1", "AttributeText": "Is catch data collected?"},
                {"AttributeID": "a-q2", "AttributeText": "How many species are targeted?"},
                {"AttributeID": "a-t1", "AttributeText": "Catch disposal records"},
                {"AttributeID": "a-t2", "AttributeText": "Stock assessment"},
                {"AttributeID": "a-t2-d", "AttributeText": "Length based"}
            ]
        },
        "targets": [
            {"TargetID": 10, "Title": "a-t1", "Attributes": ["a-t1"], "Reference": "Monitoring:47"},
            {"TargetID": 11, "Title": "a-t2", "Attributes": ["a-t2", "a-t2-d"], "Reference": "Assessment:3"}
        ],
        "questions": [
            {"QuestionID": 1, "Title": "a-q1", "Attributes": [], "ValidAnswers": ["1-No", "2-Yes"]},
            {"QuestionID": 2, "Title": "a-q2", "Attributes": [], "ValidAnswers": ["1-One", "2-Several"]}
        ],
        "criteria": [
            {"QuestionID": 1, "TargetID": 10, "Threshold": "2-Yes"}
        ],
        "caveats": [
            {"QuestionID": 2, "TargetID": 11, "Answers": [{"NoteID": "n1", "Answer": "Several"}]}
        ],
        "colormap": [
            {"ColorName": "FFFF0000", "Score": -3}
        ],
        "notes": {
            "Elements": [
                {"NoteID": "n1", "NoteColor": "FFFF0000", "NoteText": "Mixed species complicate assessment"}
            ]
        }
    })
}
