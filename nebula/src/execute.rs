use std::sync::LazyLock;
use std::time::Instant;

use nebula_api::prelude::*;
use rand::Rng;
use regex::Regex;

use crate::error::NebulaError;

// Nothing is executed. The output is every quoted literal that follows a
// `Print`, the statistics are random.

static PRINT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"Print\s+"([^"]+)""#).expect("print pattern is valid"));

/// The fake program output for `code`.
pub fn simulated_output(code: &str) -> String {
    if code.contains("Print") {
        PRINT_PATTERN
            .captures_iter(code)
            .map(|captures| captures[1].to_string())
            .collect::<Vec<_>>()
            .join("\n")
    } else if code.contains("neural_networks") {
        "Neural networks package loaded\nQuantum neurons initialized\nReady for consciousness alteration!"
            .to_string()
    } else if code.contains("time_travel") {
        "Time travel package loaded\nTemporal displacement initiated\nTimeline stabilized!"
            .to_string()
    } else if code.contains("quantum_computing") {
        "Quantum computing package loaded\nQuantum entanglement established\nReality manipulation ready!"
            .to_string()
    } else {
        "Trica bytecode execution complete\nMind destruction successful!".to_string()
    }
}

pub fn random_stats<R: Rng + ?Sized>(rng: &mut R) -> ExecuteStats {
    ExecuteStats {
        bytecode_instructions: rng.random_range(10..110),
        memory_used: format!("{}KB", rng.random_range(64..576)),
        quantum_states: rng.random_range(1..=16),
        mind_destruction_level: rng.random_range(1..=11),
    }
}

pub fn execute(request: ExecuteRequest) -> Result<ExecuteResponse, NebulaError> {
    let started = Instant::now();
    let code = request.code.filter(|code| !code.is_empty()).ok_or_else(|| {
        NebulaError::invalid_argument("No code provided", "Code is required for execution")
    })?;

    let mut rng = rand::rng();
    let output = simulated_output(&code);
    let execution_time: f64 = rng.random_range(0.0001..0.001);
    let stats = random_stats(&mut rng);
    let elapsed = started.elapsed().as_secs_f64() * 1000.0;

    Ok(ExecuteResponse {
        success: true,
        output,
        execution_time: format!("{execution_time:.6}ms"),
        actual_response_time: format!("{elapsed:.3}ms"),
        message: "Code executed successfully".to_string(),
        stats,
    })
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::Value;
    use serde_json::json;

    use super::*;
    use crate::error::ErrorKind;
    use crate::tests::memory_server;

    #[test]
    fn echoes_print_literals() {
        let code = r#"Main {
    Print "Hello, Trica"
    x = 5
    Print   "second line"
    Print ""
    Print x
}"#;
        assert_eq!(simulated_output(code), "Hello, Trica\nsecond line");
    }

    #[test]
    fn print_without_literals_is_empty() {
        assert_eq!(simulated_output("Main { Print x }"), "");
    }

    #[test]
    fn keyword_banners() {
        assert!(simulated_output("import neural_networks").starts_with("Neural networks"));
        assert!(simulated_output("import time_travel").starts_with("Time travel"));
        assert!(simulated_output("import quantum_computing").starts_with("Quantum computing"));
        assert!(simulated_output("Main {}").starts_with("Trica bytecode"));
    }

    #[test]
    fn stats_stay_in_range() {
        let mut rng = rand::rng();
        for _ in 0..200 {
            let stats = random_stats(&mut rng);
            assert!((10..110).contains(&stats.bytecode_instructions));
            assert!((1..=16).contains(&stats.quantum_states));
            assert!((1..=11).contains(&stats.mind_destruction_level));
            let kb: u32 = stats.memory_used.trim_end_matches("KB").parse().unwrap();
            assert!((64..576).contains(&kb));
        }
    }

    #[test]
    fn empty_code_is_rejected() {
        for code in [None, Some(String::new())] {
            let e = execute(ExecuteRequest { code }).unwrap_err();
            assert_eq!(e.kind(), ErrorKind::InvalidArgument);
        }
    }

    #[tokio::test]
    async fn execute_route() {
        let server = TestServer::new(memory_server()).unwrap();

        let response = server
            .post("/execute")
            .json(&json!({ "code": "Main { Print \"hi\" }" }))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["success"], true);
        assert_eq!(body["output"], "hi");
        assert!(body["stats"]["quantumStates"].is_u64());
        assert!(body["executionTime"].as_str().unwrap().ends_with("ms"));

        let response = server.post("/execute").json(&json!({})).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "No code provided");
    }
}
