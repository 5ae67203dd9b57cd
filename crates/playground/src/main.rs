mod args;

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use analytics::{DerivedMetrics, MetricsPolicy, PlaybackEngine};
use clap::Parser;
use client::{ApiClient, ApiConfig, OptimizeSession, RouteRequestBuilder, SessionError};
use model::{request::OptimizeRequest, route::RouteModel, ExampleData};
use serde::Serialize;

use crate::args::Args;

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    if args.schema {
        return print_json(&schemars::schema_for!(OptimizeRequest));
    }

    let client = ApiClient::new(ApiConfig::from_env());
    if args.health {
        match client.config().endpoints() {
            Ok(endpoints) => {
                println!("health:   {}", endpoints.health);
                println!("optimize: {}", endpoints.optimize);
                println!("layout:   {}", endpoints.layout);
            }
            Err(why) => eprintln!("{why}"),
        }
        let report = client.health().await;
        let took = report
            .response_time
            .map(|time| format!(" in {} ms", time.as_millis()))
            .unwrap_or_default();
        match &report.error {
            Some(error) => println!("{}{took}: {error}", report.status),
            None => println!("{}{took}", report.status),
        }
        return if report.is_up() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        };
    }

    let route = if args.sample {
        log::info!("Using the bundled sample route.");
        Arc::new(RouteModel::example_data())
    } else {
        let builder = RouteRequestBuilder::new(args.skus.as_str())
            .strategy(args.strategy.clone())
            .start_location(&args.start)
            .end_location(&args.end)
            .full_settings(args.full_settings);
        let mut session = OptimizeSession::new(client);
        match session.optimize(&builder).await {
            Ok(route) => route,
            Err(why) => {
                report_error(&why);
                return ExitCode::FAILURE;
            }
        }
    };

    if args.json {
        return print_json(route.as_ref());
    }

    print_route(&route);
    print_metrics(&MetricsPolicy::default().derive(&route));
    print_frames(&route, args.frames);
    ExitCode::SUCCESS
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(why) => {
            log::error!("could not serialize output: {why}");
            ExitCode::FAILURE
        }
    }
}

fn report_error(error: &SessionError) {
    match error {
        SessionError::Validation(why) => eprintln!("Invalid input: {why}"),
        SessionError::Api(why) => {
            eprintln!("[{}] {}", why.kind(), why.user_message());
            for hint in why.hints() {
                eprintln!("  - {hint}");
            }
        }
    }
}

fn print_route(route: &RouteModel) {
    println!(
        "strategy: {}  stops: {}  distance: {:.2}",
        route.strategy(),
        route.len(),
        route.total_distance()
    );
    println!(
        "{:>4}  {:<10} {:<14} {:>8} {:>8} {:>8} {:>10}",
        "#", "location", "sku", "x", "y", "leg", "cumulative"
    );
    for stop in route.ordered_stops() {
        println!(
            "{:>4}  {:<10} {:<14} {:>8.1} {:>8.1} {:>8.2} {:>10.2}",
            stop.sequence,
            stop.location_code,
            stop.sku.as_deref().unwrap_or("-"),
            stop.x,
            stop.y,
            stop.leg_distance,
            stop.cumulative_distance
        );
    }
}

fn print_metrics(metrics: &DerivedMetrics) {
    println!();
    println!("picking stops:        {}", metrics.picking_stops);
    println!(
        "estimated time:       {:.1} min",
        metrics.estimated_time_minutes
    );
    println!("efficiency:           {:.0}%", metrics.efficiency * 100.0);
    println!(
        "distance utilization: {:.0}%",
        metrics.distance_utilization * 100.0
    );
    for (zone, picks) in &metrics.zone_distribution {
        println!("  {zone}: {picks}");
    }
}

fn print_frames(route: &RouteModel, count: usize) {
    if count == 0 {
        return;
    }
    println!();

    let start = Instant::now();
    let mut engine = PlaybackEngine::new(true);
    engine.load(route, start);

    for frame in 0..count {
        let fraction = if count > 1 {
            frame as f64 / (count - 1) as f64
        } else {
            1.0
        };
        engine.tick(start + engine.duration().mul_f64(fraction));

        let frame = engine.frame(route.ordered_stops());
        let position = frame
            .position
            .map(|point| format!("({:.1}, {:.1})", point.x, point.y))
            .unwrap_or_else(|| "-".to_owned());
        let reached = frame.reached.iter().filter(|reached| **reached).count();
        println!(
            "{:>6.1}%  picker at {position:<14} path points: {:<3} reached: {reached}/{}",
            frame.progress * 100.0,
            frame.path.len(),
            route.len()
        );
    }
}
