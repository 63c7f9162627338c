//! Integration Test Harness
//!
//! Runs every integration test category and prints a summary.
//!
//! # Usage
//!
//! Run all tests:
//! ```text
//! cargo run -p integration-tests
//! ```
//!
//! Run specific test categories:
//! ```text
//! cargo test -p integration-tests --test wire_format_tests
//! cargo test -p integration-tests --test pointer_tests
//! cargo test -p integration-tests --test iisa_tests
//! cargo test -p integration-tests --test nspi_tests
//! ```
//!
//! Run with codec tracing:
//! ```text
//! RUST_LOG=msrpc_ndr=trace cargo test -p integration-tests --test pointer_tests -- --nocapture
//! ```

use std::process::Command;
use std::time::{Duration, Instant};

/// Test category
#[derive(Debug, Clone)]
struct TestCategory {
    name: &'static str,
    description: &'static str,
    test_name: &'static str,
}

const TEST_CATEGORIES: &[TestCategory] = &[
    TestCategory {
        name: "Wire Format Tests",
        description: "Byte layouts, alignment, unions and size validation",
        test_name: "wire_format_tests",
    },
    TestCategory {
        name: "Pointer Tests",
        description: "Referent IDs, full pointer aliasing, null handling",
        test_name: "pointer_tests",
    },
    TestCategory {
        name: "IIS Application Host Tests",
        description: "DCOM getter exchanges with ORPC envelopes and BSTRs",
        test_name: "iisa_tests",
    },
    TestCategory {
        name: "NSPI Tests",
        description: "Address book sessions, property rows and status codes",
        test_name: "nspi_tests",
    },
];

fn print_banner() {
    println!("{}", "=".repeat(80));
    println!("               MSRPC NDR Integration Test Suite");
    println!("{}", "=".repeat(80));
}

/// Outcome of one category run
struct CategoryResult {
    category: &'static TestCategory,
    passed: bool,
    duration: Duration,
    detail: String,
}

fn print_test_categories(categories: &[&TestCategory]) {
    println!("Test Categories:");
    println!("{}", "-".repeat(80));
    for (i, cat) in categories.iter().enumerate() {
        println!("  {}. {} - {}", i + 1, cat.name, cat.description);
    }
    println!("{}", "-".repeat(80));
}

fn run_test_category(category: &'static TestCategory) -> CategoryResult {
    println!("\nRunning: {}", category.name);

    let start = Instant::now();
    let output = Command::new(std::env::var("CARGO").unwrap_or_else(|_| "cargo".to_string()))
        .args(["test", "-p", "integration-tests", "--test", category.test_name])
        .output();
    let duration = start.elapsed();

    let (passed, detail) = match output {
        Ok(output) => {
            print!("{}", String::from_utf8_lossy(&output.stdout));
            if !output.status.success() {
                eprint!("{}", String::from_utf8_lossy(&output.stderr));
            }
            match output.status.code() {
                Some(0) => (true, "PASSED".to_string()),
                code => (false, format!("FAILED (exit code: {:?})", code)),
            }
        }
        Err(e) => (false, format!("Failed to execute: {}", e)),
    };

    CategoryResult {
        category,
        passed,
        duration,
        detail,
    }
}

/// Run every category, or only those whose test name contains one of the
/// command-line arguments.
fn main() {
    let filters: Vec<String> = std::env::args().skip(1).collect();
    let selected: Vec<&'static TestCategory> = TEST_CATEGORIES
        .iter()
        .filter(|c| filters.is_empty() || filters.iter().any(|f| c.test_name.contains(f.as_str())))
        .collect();

    print_banner();
    print_test_categories(&selected);

    let total_start = Instant::now();
    let results: Vec<CategoryResult> = selected.into_iter().map(run_test_category).collect();
    let total_duration = total_start.elapsed();

    println!("\n{}", "=".repeat(80));
    println!("FINAL SUMMARY");
    println!("{}", "=".repeat(80));

    let failed = results.iter().filter(|r| !r.passed).count();
    println!(
        "\nCategories: {} | Passed: {} | Failed: {}",
        results.len(),
        results.len() - failed,
        failed
    );
    println!("Total Duration: {:?}\n", total_duration);

    println!("{:<30} {:<10} {:<15} {}", "Category", "Status", "Duration", "Details");
    println!("{}", "-".repeat(80));
    for result in &results {
        let status = if result.passed { "PASS" } else { "FAIL" };
        println!(
            "{:<30} {:<10} {:<15?} {}",
            result.category.name, status, result.duration, result.detail
        );
    }

    std::process::exit(if failed > 0 { 1 } else { 0 });
}
