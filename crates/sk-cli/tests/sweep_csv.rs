use std::process::Command;

#[test]
fn sweep_writes_one_row_per_beta() {
    let output = Command::new(env!("CARGO_BIN_EXE_sk-sweep"))
        .args([
            "--beta-start",
            "0.1",
            "--beta-stop",
            "0.3",
            "--beta-step",
            "0.1",
            "--spins-number",
            "30",
            "--jobs",
            "2",
        ])
        .output()
        .expect("run sk-sweep");
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let mut reader = csv::Reader::from_reader(output.stdout.as_slice());
    let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
    assert_eq!(
        headers,
        [
            "beta",
            "is_converged",
            "iterations_number",
            "discrepancy",
            "bethe_free_entropy",
            "replica_symmetric_free_entropy"
        ]
    );
    let betas: Vec<f64> = reader
        .records()
        .map(|record| record.unwrap()[0].parse().unwrap())
        .collect();
    assert_eq!(betas.len(), 3);
    assert!(betas.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn empty_grid_is_rejected() {
    let output = Command::new(env!("CARGO_BIN_EXE_sk-sweep"))
        .args(["--beta-start", "1.0", "--beta-stop", "0.5"])
        .output()
        .expect("run sk-sweep");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("beta-grid"));
}
