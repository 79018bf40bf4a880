// Entry point and interactive menu.
//
// - Option [1] loads a snapshot (JSON or CSV) and prints load diagnostics.
// - Option [2] shows the dashboard: KPIs, a chart series and gap reasons.
// - Option [3] exports the spreadsheet report for a date range.
use chrono::{Duration, Local, NaiveDate};
use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::io::{self, Write};
use std::sync::Mutex;
use swm_report::config::AppConfig;
use swm_report::loader::{self, Snapshot};
use swm_report::types::{FilterSpec, Granularity, Scope};
use swm_report::util::{format_int, format_number, parse_date_safe};
use swm_report::{export, filter, output, reports, series};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

// Loaded once, reused by every dashboard and export pass in this run.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| Mutex::new(AppState { data: None }));

struct AppState {
    data: Option<Snapshot>,
}

fn init_tracing() {
    let default = if std::env::var_os("SWM_DEBUG").is_some() {
        "debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .compact()
        .init();
}

fn prompt(label: &str) -> String {
    read_line(label).unwrap_or_default()
}

/// `None` once stdin is closed.
fn read_line(label: &str) -> Option<String> {
    print!("{}", label);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    match io::stdin().read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

/// Ask for a date, keeping `default` on blank or unreadable input.
fn prompt_date(label: &str, default: NaiveDate) -> NaiveDate {
    let input = prompt(&format!("{} [{}]: ", label, default));
    if input.is_empty() {
        return default;
    }
    match parse_date_safe(Some(input.as_str())) {
        Some(d) => d,
        None => {
            println!("Unrecognised date, using {}.", default);
            default
        }
    }
}

fn prompt_scope(label: &str) -> Scope {
    match prompt(&format!("{} (blank = all): ", label)).as_str() {
        "" => Scope::All,
        id => Scope::Only(id.to_string()),
    }
}

fn prompt_granularity() -> Granularity {
    match prompt("Timeframe [1] daily [2] weekly [3] monthly: ").as_str() {
        "2" => Granularity::Weekly,
        "3" => Granularity::Monthly,
        _ => Granularity::Daily,
    }
}

fn default_range(cfg: &AppConfig) -> (NaiveDate, NaiveDate) {
    let today = Local::now().date_naive();
    (today - Duration::days(cfg.window_days), today)
}

fn loaded_snapshot() -> Option<Snapshot> {
    let state = match APP_STATE.lock() {
        Ok(s) => s,
        Err(poisoned) => poisoned.into_inner(),
    };
    state.data.clone()
}

fn handle_load(cfg: &AppConfig) {
    let path = &cfg.snapshot_path;
    match loader::load_snapshot(path) {
        Ok((snapshot, report)) => {
            println!(
                "Processing snapshot... ({} rows read, {} loaded)",
                format_int(report.total_rows),
                format_int(report.loaded_rows)
            );
            if report.skipped_rows > 0 {
                println!(
                    "Note: {} rows skipped due to missing or invalid dates.",
                    format_int(report.skipped_rows)
                );
            }
            println!();
            info!(path = %path.display(), rows = report.loaded_rows, "snapshot loaded");
            let mut state = match APP_STATE.lock() {
                Ok(s) => s,
                Err(poisoned) => poisoned.into_inner(),
            };
            state.data = Some(snapshot);
        }
        Err(e) => {
            error!(path = %path.display(), error = %e, "failed to load snapshot");
            eprintln!("Failed to load file: {}\n", e);
        }
    }
}

fn handle_dashboard(cfg: &AppConfig) {
    let Some(snapshot) = loaded_snapshot() else {
        println!("Error: No data loaded. Please load a snapshot first (option 1).\n");
        return;
    };

    let (from, to) = default_range(cfg);
    let date_from = prompt_date("Start date", from);
    let date_to = prompt_date("End date", to);
    let area = prompt_scope("Ward id");
    let supervisor = prompt_scope("Supervisor id");
    let units: HashSet<String> = prompt("Block ids, comma separated (blank = all): ")
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    let granularity = prompt_granularity();

    let spec = FilterSpec {
        area,
        units,
        supervisor,
        date_from,
        date_to,
    };
    let subset = filter::apply(&snapshot.records, &spec);
    if subset.is_empty() {
        println!("\nNo data for the selected filters.\n");
        return;
    }

    let stats = reports::dashboard_stats(&subset, cfg.screen_precision);
    let decimals = cfg.screen_precision as usize;
    println!("\nDashboard ({} to {})\n", date_from, date_to);
    println!("HH Area:       {}", format_number(stats.covered, 0));
    println!("Participation: {}%", format_number(stats.participation_pct, decimals));
    println!("Efficiency:    {}%", format_number(stats.segregation_pct, decimals));
    println!("Absences:      {}\n", format_int(stats.absences));

    let buckets = series::build(&subset, granularity);
    println!("Collection trend ({})\n", granularity);
    output::preview_table_rows(&buckets, 31);
    println!("Segregation rate by period\n");
    for bucket in &buckets {
        println!(
            "{:<16} {}%",
            bucket.label,
            format_number(bucket.segregation_pct(cfg.screen_precision), decimals)
        );
    }
    println!();
    let series_path = cfg.output_dir.join("dashboard_series.csv");
    if let Err(e) = output::write_csv(&series_path, &buckets) {
        eprintln!("Write error: {}", e);
    }
    let summary_path = cfg.output_dir.join("dashboard_summary.json");
    if let Err(e) = output::write_json(&summary_path, &stats) {
        eprintln!("Write error: {}", e);
    }

    let gaps = reports::gap_reasons(&subset);
    println!("Failure gaps\n");
    if gaps.is_empty() {
        println!("All Active!\n");
    } else {
        output::preview_table_rows(&gaps, gaps.len());
    }

    // The audit view ignores the ward, supervisor and block selections.
    let review_from = prompt_date("Audit start date", date_from);
    let review_to = prompt_date("Audit end date", date_to);
    let review = reports::review_rows(&snapshot.records, review_from, review_to);
    println!("\nRaw data audit (latest entries)\n");
    output::preview_table_rows(&review, 10);
    println!(
        "(Series exported to {}, summary to {})\n",
        series_path.display(),
        summary_path.display()
    );
}

fn handle_export(cfg: &AppConfig) {
    let Some(snapshot) = loaded_snapshot() else {
        println!("Error: No data loaded. Please load a snapshot first (option 1).\n");
        return;
    };

    let (from, to) = default_range(cfg);
    let date_from = prompt_date("Export start date", from);
    let date_to = prompt_date("Export end date", to);

    let Some(report) = export::generate(
        &snapshot.records,
        date_from,
        date_to,
        &snapshot.hierarchy,
        cfg.export_precision,
    ) else {
        println!("No data for range.\n");
        return;
    };

    let path = cfg.report_path(
        &date_from.format("%Y-%m-%d").to_string(),
        &date_to.format("%Y-%m-%d").to_string(),
    );
    match output::write_text(&path, &report) {
        Ok(()) => {
            info!(path = %path.display(), bytes = report.len(), "report exported");
            println!("CSV Report Exported to {}\n", path.display());
        }
        Err(e) => eprintln!("Write error: {}\n", e),
    }
}

fn main() {
    init_tracing();
    let cfg = AppConfig::from_env();
    loop {
        println!("Waste Collection Reporting");
        println!("[1] Load snapshot ({})", cfg.snapshot_path.display());
        println!("[2] Dashboard");
        println!("[3] Export report");
        println!("[4] Exit\n");
        let Some(choice) = read_line("Enter choice: ") else {
            break;
        };
        match choice.as_str() {
            "1" => handle_load(&cfg),
            "2" => handle_dashboard(&cfg),
            "3" => handle_export(&cfg),
            "4" => {
                println!("Exiting the program.");
                break;
            }
            _ => println!("Invalid choice. Please enter 1, 2, 3 or 4.\n"),
        }
    }
}
