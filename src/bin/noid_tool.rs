//! noid-tool - offline template/identifier decoder and validator
//!
//! Usage:
//!   noid-tool info <template> [<template>...]
//!   noid-tool valid <template> [<id>...]
//!   noid-tool generate <template> [<n>...]
//!
//! When no candidate tokens follow the template, `valid` and `generate`
//! read one token per line from standard input.

use std::io::{self, BufRead};

use noidpool::validator;

/// Yields successive whitespace-delimited tokens, either from a
/// pre-supplied list or from standard input, one per line.
enum Liner {
    Array(std::vec::IntoIter<String>),
    Stdin(io::Lines<io::StdinLock<'static>>),
}

impl Liner {
    fn from_args(args: Vec<String>) -> Self {
        Liner::Array(args.into_iter())
    }

    fn from_stdin() -> Self {
        Liner::Stdin(io::stdin().lock().lines())
    }
}

impl Iterator for Liner {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        match self {
            Liner::Array(it) => it.next(),
            Liner::Stdin(lines) => lines.next().and_then(|l| l.ok()),
        }
    }
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        print_usage();
        return;
    }

    match args[0].as_str() {
        "info" => cmd_info(&args[1..]),
        "valid" => cmd_valid(&args[1..]),
        "generate" => cmd_generate(&args[1..]),
        "help" | "--help" | "-h" => print_usage(),
        other => {
            eprintln!("unknown subcommand: {}", other);
            print_usage();
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    println!("noid-tool - offline template/identifier decoder and validator");
    println!();
    println!("Usage:");
    println!("  noid-tool info <template> [<template>...]");
    println!("  noid-tool valid <template> [<id>...]");
    println!("  noid-tool generate <template> [<n>...]");
    println!();
    println!("If no candidate tokens follow the template, valid/generate read");
    println!("one token per line from standard input.");
}

fn cmd_info(templates: &[String]) {
    if templates.is_empty() {
        eprintln!("info requires at least one template");
        std::process::exit(1);
    }
    for t in templates {
        let info = validator::info(t);
        if info.valid {
            println!(
                "{}\tValid\tposition={}\tmax={}\tpercent_used={}",
                t, info.position, info.max, info.percent_used
            );
        } else {
            println!("{}\tInvalid Template", t);
        }
    }
}

fn cmd_valid(args: &[String]) {
    let Some((template, rest)) = args.split_first() else {
        eprintln!("valid requires a template");
        std::process::exit(1);
    };

    let ids: Vec<String> = if rest.is_empty() {
        Liner::from_stdin().collect()
    } else {
        Liner::from_args(rest.to_vec()).collect()
    };

    match validator::valid(template, &ids) {
        Some(results) => {
            for (idx, id) in results {
                println!("{}\t{}", idx, id);
            }
        }
        None => {
            println!("{}\tInvalid Template", template);
        }
    }
}

fn cmd_generate(args: &[String]) {
    let Some((template, rest)) = args.split_first() else {
        eprintln!("generate requires a template");
        std::process::exit(1);
    };

    let tokens: Vec<String> = if rest.is_empty() {
        Liner::from_stdin().collect()
    } else {
        Liner::from_args(rest.to_vec()).collect()
    };

    let ns: Vec<i64> = tokens
        .iter()
        .filter_map(|t| t.trim().parse::<i64>().ok())
        .collect();

    match validator::generate(template, &ns) {
        Some(results) => {
            for (n, id) in results {
                println!("{}\t{}", n, id);
            }
        }
        None => {
            println!("{}\tInvalid Template", template);
        }
    }
}
