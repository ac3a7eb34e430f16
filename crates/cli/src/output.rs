use geoseed_core::{Config, ProvisionReport, StepStatus};

/// Print the end-of-run summary and access instructions to stdout.
pub fn print_summary(report: &ProvisionReport, config: &Config) {
    let elapsed = report.finished_at - report.started_at;
    println!(
        "Provisioning complete in {:.1}s",
        elapsed.num_milliseconds() as f64 / 1000.0
    );
    println!("Feature types {}", report.summary_line());

    let soft_failures = report.soft_failures();
    if !soft_failures.is_empty() {
        println!("Steps that need attention:");
        for record in soft_failures {
            match &record.detail {
                Some(detail) => println!("  - {}: {}", record.step, detail),
                None => println!("  - {}", record.step),
            }
        }
    }

    let skipped: Vec<_> = report
        .steps
        .iter()
        .filter(|r| r.status == StepStatus::Skipped)
        .collect();
    for record in skipped {
        println!(
            "Skipped {}: {}",
            record.step,
            record.detail.as_deref().unwrap_or("not applicable")
        );
    }

    println!();
    println!("Access:");
    for (label, url) in access_urls(config) {
        println!("  {:<22} {}", label, url);
    }
}

/// Entry points a user will want after provisioning.
pub fn access_urls(config: &Config) -> Vec<(&'static str, String)> {
    let base = config.server.url.trim_end_matches('/');
    let workspace = urlencoding::encode(&config.workspace.name);
    let group = urlencoding::encode(&config.layer_group.name);

    vec![
        ("Admin console:", format!("{}/web/", base)),
        (
            "WMS capabilities:",
            format!(
                "{}/{}/wms?service=WMS&version=1.3.0&request=GetCapabilities",
                base, workspace
            ),
        ),
        (
            "Layer group preview:",
            format!(
                "{}/{}/wms/reflect?layers={}:{}&format=application/openlayers",
                base, workspace, workspace, group
            ),
        ),
        (
            "WMTS capabilities:",
            format!("{}/gwc/service/wmts?REQUEST=GetCapabilities", base),
        ),
    ]
}
