//! CLI Tests

#[cfg(test)]
mod tests {
    use crate::cli::{
        execute, parse_filters, parse_object, resolve_config, Cli, CliError, Commands, IdArgs,
    };
    use clap::Parser;
    use recstore_persistence::{open_repository, SharedRepository, StorageConfig, StorageError};
    use serde_json::{json, Value};
    use std::path::PathBuf;
    use tempfile::TempDir;

    async fn temp_repo(dir: &TempDir) -> SharedRepository {
        open_repository(&StorageConfig::new(dir.path().join("users.json")))
            .await
            .unwrap()
    }

    async fn run(repo: &SharedRepository, args: &[&str]) -> Result<Value, CliError> {
        let cli = Cli::try_parse_from(std::iter::once("recstore").chain(args.iter().copied())).unwrap();
        let output = execute(&cli.command, repo).await?;
        Ok(serde_json::from_str(&output).unwrap())
    }

    /// Test argument parsing for every subcommand
    #[test]
    fn test_parse_subcommands() {
        let cli = Cli::try_parse_from(["recstore", "-s", "people.json", "get", "abc"]).unwrap();
        assert_eq!(cli.store, Some(PathBuf::from("people.json")));
        assert_eq!(cli.command, Commands::Get(IdArgs { id: "abc".to_string() }));

        let cli = Cli::try_parse_from(["recstore", "find", "-w", "a=1", "--where", "b=x", "-v"]).unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Find(args) => assert_eq!(args.filters, vec!["a=1", "b=x"]),
            other => panic!("unexpected command {other:?}"),
        }

        assert!(Cli::try_parse_from(["recstore", "find"]).is_err());
        assert!(Cli::try_parse_from(["recstore", "update", "abc"]).is_err());
        assert!(Cli::try_parse_from(["recstore"]).is_err());
    }

    /// Test flags override the default storage path
    #[test]
    fn test_resolve_config_flags() {
        let cli = Cli::try_parse_from(["recstore", "--store", "flag.json", "--atomic", "list"]).unwrap();
        let config = resolve_config(&cli).unwrap();
        assert_eq!(config.storage.path, PathBuf::from("flag.json"));
        assert!(config.storage.atomic_writes);
    }

    /// Test a config file that cannot be read
    #[test]
    fn test_resolve_config_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope.yaml");
        let cli = Cli::try_parse_from(["recstore", "-c", missing.to_str().unwrap(), "list"]).unwrap();
        assert!(matches!(resolve_config(&cli), Err(CliError::Config(_))));
    }

    #[test]
    fn test_parse_object() {
        let attrs = parse_object(r#"{"name": "Ann", "age": 3}"#).unwrap();
        assert_eq!(attrs["name"], "Ann");

        assert!(matches!(parse_object("[1, 2]"), Err(CliError::InvalidInput(_))));
        assert!(matches!(parse_object("{oops"), Err(CliError::InvalidInput(_))));
    }

    #[test]
    fn test_parse_filters() {
        let raw = vec![
            "age=30".to_string(),
            "name=Ann".to_string(),
            "admin=true".to_string(),
            "note=a=b".to_string(),
        ];
        let filters = parse_filters(&raw).unwrap();
        assert_eq!(filters["age"], 30);
        assert_eq!(filters["name"], "Ann");
        assert_eq!(filters["admin"], true);
        assert_eq!(filters["note"], "a=b");

        assert!(parse_filters(&["novalue".to_string()]).is_err());
        assert!(parse_filters(&["=1".to_string()]).is_err());
    }

    /// Test create, get, update, find, delete through the command layer
    #[tokio::test]
    async fn test_command_lifecycle() {
        let temp_dir = TempDir::new().unwrap();
        let repo = temp_repo(&temp_dir).await;

        let ann = run(&repo, &["create", r#"{"name": "Ann", "role": "admin"}"#]).await.unwrap();
        let ann_id = ann["id"].as_str().unwrap().to_string();
        run(&repo, &["create", r#"{"name": "Bo", "role": "admin"}"#]).await.unwrap();

        let fetched = run(&repo, &["get", &ann_id]).await.unwrap();
        assert_eq!(fetched, ann);

        let updated = run(&repo, &["update", &ann_id, r#"{"role": "user"}"#]).await.unwrap();
        assert_eq!(updated["role"], "user");
        assert_eq!(updated["name"], "Ann");

        let found = run(&repo, &["find", "-w", "role=admin"]).await.unwrap();
        assert_eq!(found["name"], "Bo");

        let deleted = run(&repo, &["delete", &ann_id]).await.unwrap();
        assert_eq!(deleted, json!({"id": ann_id, "deleted": true}));

        let missing = run(&repo, &["get", &ann_id]).await.unwrap();
        assert_eq!(missing, Value::Null);

        let all = run(&repo, &["list"]).await.unwrap();
        assert_eq!(all.as_array().unwrap().len(), 1);
    }

    /// Test update of an unknown id surfaces the storage error
    #[tokio::test]
    async fn test_update_unknown_id() {
        let temp_dir = TempDir::new().unwrap();
        let repo = temp_repo(&temp_dir).await;

        let err = run(&repo, &["update", "ffffffff", r#"{"a": 1}"#]).await.unwrap_err();
        assert!(matches!(err, CliError::Storage(StorageError::NotFound(_))));
        assert_eq!(err.to_string(), "record with id ffffffff not found");
    }
}
