use serde::Serialize;

use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};
use crate::output::OutputFormat;

#[derive(Debug, Serialize)]
struct BuildInfo {
    name: &'static str,
    version: &'static str,
    target: &'static str,
    rustc: &'static str,
    git_hash: &'static str,
    async_feature: bool,
}

impl BuildInfo {
    fn current() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            target: option_env!("SYNBRIDGE_BUILD_TARGET").unwrap_or("unknown"),
            rustc: option_env!("SYNBRIDGE_RUSTC_VERSION").unwrap_or("unknown"),
            git_hash: option_env!("SYNBRIDGE_GIT_HASH").unwrap_or("unknown"),
            async_feature: cfg!(feature = "async"),
        }
    }
}

pub fn run(args: VersionArgs, format: OutputFormat) -> CliResult<i32> {
    let info = BuildInfo::current();
    if !args.extended {
        println!("{} {}", info.name, info.version);
        return Ok(SUCCESS);
    }

    match format {
        OutputFormat::Json | OutputFormat::Raw => println!(
            "{}",
            serde_json::to_string(&info).unwrap_or_else(|_| "{}".to_string())
        ),
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("name: {}", info.name);
            println!("version: {}", info.version);
            println!("target: {}", info.target);
            println!("rustc: {}", info.rustc);
            println!("git_hash: {}", info.git_hash);
            println!("features: async={}, cli=true", info.async_feature);
        }
    }
    Ok(SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_info_names_this_package() {
        let info = BuildInfo::current();
        assert_eq!(info.name, "synbridge");
        assert_eq!(info.version, env!("CARGO_PKG_VERSION"));
        assert!(!info.rustc.is_empty());
    }
}
