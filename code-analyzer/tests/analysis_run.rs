use chrono::{Local, TimeZone};
use code_analyzer::{AnalyzerConfig, Severity, analyze_source, run};

fn cfg(dir: &std::path::Path) -> AnalyzerConfig {
    AnalyzerConfig {
        workdir: dir.to_path_buf(),
        changed_files: "changed_files.txt".into(),
        output_root: "code-analysis".into(),
        commit_sha: "0123456789abcdef".into(),
        repository: "acme/widgets".into(),
    }
}

#[test]
fn analyze_source_combines_all_scanners() {
    let src = "// login helper\nconst password = \"hunter2hunter2\";\nfunction login() {\n  return eval(input);\n}\n";
    let a = analyze_source("src/login.ts", src);
    assert_eq!(a.language, "typescript");
    assert_eq!(a.security_vulnerabilities.len(), 2);
    assert!(a.security_vulnerabilities.iter().all(|v| v.severity == Severity::Medium));
    let q = &a.quality_score;
    assert_eq!(q.total, q.documentation + q.complexity + q.maintainability);
}

#[test]
fn run_writes_timestamped_and_latest_reports() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    std::fs::create_dir_all(root.join("src")).unwrap();
    std::fs::write(root.join("src/a.py"), "def f(xs):\n    for a in xs:\n        for b in xs:\n            pass\n").unwrap();
    std::fs::write(root.join("README.md"), "# readme\n").unwrap();
    std::fs::write(root.join("changed_files.txt"), "src/a.py\nREADME.md\nsrc/deleted.ts\n\n").unwrap();

    let now = Local.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap();
    let summary = run(&cfg(root), now).unwrap().expect("one code file");

    assert_eq!(summary.results.len(), 1);
    assert_eq!(summary.performance_issues, 1);
    assert!(summary.output_dir.ends_with("code-analysis/20250301-093000_0123456"));
    assert!(summary.output_dir.join("results.json").exists());

    let report = std::fs::read_to_string(root.join("analysis_report.md")).unwrap();
    assert!(report.starts_with("# Code Analysis Report"));
    assert!(report.contains("| a.py |"));
    assert!(report.contains("## 🐌 Performance Issues"));
    assert!(report.contains("[`0123456`](https://github.com/acme/widgets/commit/0123456789abcdef)"));

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(root.join("analysis_results.json")).unwrap()).unwrap();
    assert_eq!(json[0]["file"], "src/a.py");
    assert_eq!(json[0]["performance_issues"][0]["type"], "nested_loops");
}

#[test]
fn nothing_to_do_without_code_files() {
    let dir = tempfile::tempdir().unwrap();
    assert!(run(&cfg(dir.path()), Local::now()).unwrap().is_none());
    std::fs::write(dir.path().join("changed_files.txt"), "docs/a.md\n").unwrap();
    assert!(run(&cfg(dir.path()), Local::now()).unwrap().is_none());
}
