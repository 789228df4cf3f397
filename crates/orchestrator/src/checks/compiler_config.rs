use std::path::Path;

use serde_json::{json, Map, Value};

use crate::stage::{StageError, StageResult};

pub const TSCONFIG_FILE: &str = "tsconfig.json";

/// Settings that must be present and explicitly set to a boolean.
const EXPLICIT_FLAGS: [&str; 3] = ["noImplicitAny", "noImplicitThis", "strictNullChecks"];

/// Verifies the `compilerOptions` of a package's tsconfig.
pub fn check_compiler_config(tsconfig: &Value, path: &Path) -> StageResult {
    let options = tsconfig
        .get("compilerOptions")
        .and_then(Value::as_object)
        .ok_or_else(|| {
            StageError::invalid(format!(
                "Expected \"compilerOptions\" object in {}",
                path.display()
            ))
        })?;

    check_required_values(options)?;

    if !options.contains_key("lib") {
        return Err(StageError::invalid(
            "Must specify \"lib\", usually to `\"lib\": [\"es6\"]` or `\"lib\": [\"es6\", \"dom\"]`.",
        ));
    }

    for key in EXPLICIT_FLAGS {
        if !options.get(key).is_some_and(Value::is_boolean) {
            return Err(StageError::invalid(format!(
                "Expected `\"{key}\": true` or `\"{key}\": false`."
            )));
        }
    }

    check_types(options)
}

fn check_required_values(options: &Map<String, Value>) -> StageResult {
    let must_have = [
        ("module", json!("commonjs")),
        ("noEmit", json!(true)),
        ("forceConsistentCasingInFileNames", json!(true)),
    ];

    for (key, expected) in must_have {
        if options.get(key) != Some(&expected) {
            let shown = match &expected {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            return Err(StageError::invalid(format!(
                "Expected compilerOptions[\"{key}\"] === {shown}"
            )));
        }
    }
    Ok(())
}

// Ambient types come in through `/// <reference types>` directives only.
fn check_types(options: &Map<String, Value>) -> StageResult {
    let types = options.get("types");

    if options.contains_key("typeRoots") && types.is_none() {
        return Err(StageError::invalid(
            "If the \"typeRoots\" option is specified in your tsconfig, you must include `\"types\": []` to prevent very long compile times.",
        ));
    }

    match types {
        None => Ok(()),
        Some(Value::Array(list)) if list.is_empty() => Ok(()),
        Some(_) => Err(StageError::invalid(
            "Use `/// <reference types=\"...\" />` directives in source files and ensure that the \"types\" field in your tsconfig is an empty array.",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Value {
        json!({
            "compilerOptions": {
                "module": "commonjs",
                "lib": ["es6"],
                "noImplicitAny": true,
                "noImplicitThis": false,
                "strictNullChecks": true,
                "noEmit": true,
                "forceConsistentCasingInFileNames": true,
                "typeRoots": ["../"],
                "types": []
            },
            "files": ["index.d.ts"]
        })
    }

    fn without(key: &str) -> Value {
        let mut config = valid_config();
        config["compilerOptions"]
            .as_object_mut()
            .unwrap()
            .remove(key);
        config
    }

    fn message(config: &Value) -> String {
        check_compiler_config(config, Path::new("/dt/pkg/tsconfig.json"))
            .unwrap_err()
            .to_string()
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(check_compiler_config(&valid_config(), Path::new("tsconfig.json")).is_ok());
    }

    #[test]
    fn test_missing_compiler_options() {
        let msg = message(&json!({ "files": [] }));
        assert_eq!(msg, "Expected \"compilerOptions\" object in /dt/pkg/tsconfig.json");
    }

    #[test]
    fn test_wrong_module() {
        let mut config = valid_config();
        config["compilerOptions"]["module"] = json!("es2015");
        assert_eq!(message(&config), "Expected compilerOptions[\"module\"] === commonjs");
    }

    #[test]
    fn test_each_required_setting_is_named() {
        for key in [
            "module",
            "noEmit",
            "forceConsistentCasingInFileNames",
            "lib",
            "noImplicitAny",
            "noImplicitThis",
            "strictNullChecks",
        ] {
            let msg = message(&without(key));
            assert!(msg.contains(key), "message for {key} was: {msg}");
        }
    }

    #[test]
    fn test_explicit_false_is_accepted() {
        let mut config = valid_config();
        config["compilerOptions"]["strictNullChecks"] = json!(false);
        assert!(check_compiler_config(&config, Path::new("tsconfig.json")).is_ok());
    }

    #[test]
    fn test_non_boolean_flag_rejected() {
        let mut config = valid_config();
        config["compilerOptions"]["noImplicitAny"] = json!("yes");
        assert_eq!(
            message(&config),
            "Expected `\"noImplicitAny\": true` or `\"noImplicitAny\": false`."
        );
    }

    #[test]
    fn test_type_roots_requires_types() {
        let msg = message(&without("types"));
        assert!(msg.starts_with("If the \"typeRoots\" option is specified"));
    }

    #[test]
    fn test_types_must_be_empty() {
        let mut config = valid_config();
        config["compilerOptions"]["types"] = json!(["node"]);
        assert!(message(&config).starts_with("Use `/// <reference types=\"...\" />`"));
    }

    #[test]
    fn test_no_type_roots_and_no_types_passes() {
        let mut config = without("types");
        config["compilerOptions"]
            .as_object_mut()
            .unwrap()
            .remove("typeRoots");
        assert!(check_compiler_config(&config, Path::new("tsconfig.json")).is_ok());
    }
}
