use std::path::PathBuf;

const VALUE_FLAGS: [&str; 6] = ["--config", "--roster", "--target", "--out-dir", "--xlsx", "--json"];

pub fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

pub fn load_dotenv() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
}

pub fn arg_value(args: &[String], name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&prefix) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == name {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() {
                return Some(next.trim().to_string());
            }
        }
    }
    None
}

pub fn arg_path(args: &[String], name: &str) -> Option<PathBuf> {
    arg_value(args, name).map(PathBuf::from)
}

pub fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

pub fn positional(args: &[String]) -> Vec<PathBuf> {
    let mut out = Vec::new();
    let mut skip_next = false;
    for arg in args {
        if skip_next {
            skip_next = false;
            continue;
        }
        if VALUE_FLAGS.contains(&arg.as_str()) {
            skip_next = true;
            continue;
        }
        if arg.starts_with("--") {
            continue;
        }
        out.push(PathBuf::from(arg));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn values_and_positionals() {
        let a = args(&[
            "--roster",
            "Leeds,Burnley",
            "2022-23.csv",
            "--config=cfg.json",
            "--verbose",
            "2023-24.csv",
        ]);
        assert_eq!(arg_value(&a, "--roster").as_deref(), Some("Leeds,Burnley"));
        assert_eq!(arg_path(&a, "--config"), Some(PathBuf::from("cfg.json")));
        assert!(has_flag(&a, "--verbose"));
        assert_eq!(
            positional(&a),
            vec![PathBuf::from("2022-23.csv"), PathBuf::from("2023-24.csv")]
        );
        assert_eq!(arg_value(&a, "--json"), None);
    }
}
