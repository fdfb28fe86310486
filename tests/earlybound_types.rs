//! On-disk generation tests for the social engagement fixture

use std::fs;
use std::path::{Path, PathBuf};

use earlybound::codegen::{
    generate_all_from_config, generate_from_yaml, load_adapter, DiskStore, EntityGroup,
    GenerationConfig, GenerationError, SnapshotAdapter,
};
use regex::Regex;
use tempfile::TempDir;

const FIXTURE_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/config/examples/social");

fn fixture_adapter() -> SnapshotAdapter {
    load_adapter(Path::new(FIXTURE_DIR).join("metadata.yaml")).unwrap()
}

fn social_group(dir: &Path, emit_option_set_enums: bool, one_type_per_file: bool) -> EntityGroup {
    EntityGroup {
        entities: vec!["socialprofile".to_string(), "socialactivity".to_string()],
        emit_option_set_enums,
        one_type_per_file,
        output_file_name: "entities.cs".to_string(),
        output_directory: dir.to_path_buf(),
        ..EntityGroup::default()
    }
}

fn generate(group: EntityGroup) {
    let config = GenerationConfig { groups: vec![group] };
    generate_all_from_config(&config, &fixture_adapter(), &mut DiskStore).unwrap();
}

fn files_under(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        if path.is_dir() {
            files.extend(files_under(&path));
        } else {
            files.push(path);
        }
    }
    files
}

/// Count matches of `pattern` across every file under `dir`
fn count_matches(pattern: &str, dir: &Path) -> usize {
    let re = Regex::new(pattern).unwrap();
    files_under(dir)
        .iter()
        .map(|path| re.find_iter(&fs::read_to_string(path).unwrap()).count())
        .sum()
}

fn count_in_file(pattern: &str, path: &Path) -> usize {
    let re = Regex::new(pattern).unwrap();
    re.find_iter(&fs::read_to_string(path).unwrap()).count()
}

#[test]
fn test_generate_optionsets() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path();
    generate(social_group(dir, true, false));

    // The global set is referenced by both entities but declared once
    assert_eq!(count_matches(r"public enum SocialProfile_Community\b", dir), 1);
    assert_eq!(count_matches(r"public enum SocialActivity_PriorityCode\b", dir), 1);

    let entities = dir.join("entities.cs");
    assert!(entities.exists());
    assert_eq!(count_in_file(r"public partial class SocialProfile\b", &entities), 1);
    assert_eq!(count_in_file(r"public partial class SocialActivity\b", &entities), 1);
    assert_eq!(count_in_file(r"public enum SocialActivity_PriorityCode\b", &entities), 1);

    let option_sets = dir.join("optionsets.cs");
    assert_eq!(count_in_file(r"public enum SocialProfile_Community\b", &option_sets), 1);

    let actions = dir.join("actions.cs");
    assert!(actions.exists());
    assert_eq!(count_in_file(r"public partial class new_FlagProfileRequest\b", &actions), 1);
    assert_eq!(count_in_file(r"public partial class new_FlagProfileResponse\b", &actions), 1);
}

#[test]
fn test_generate_optionsets_one_type_per_file() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path();
    generate(social_group(dir, true, true));

    assert!(!dir.join("entities.cs").exists());
    assert!(!dir.join("optionsets.cs").exists());

    let entities = dir.join("Entities");
    assert_eq!(
        count_in_file(r"public partial class SocialProfile\b", &entities.join("SocialProfile.cs")),
        1
    );
    assert_eq!(
        count_in_file(r"public partial class SocialActivity\b", &entities.join("SocialActivity.cs")),
        1
    );

    let option_sets = dir.join("OptionSets");
    assert_eq!(
        count_in_file(
            r"public enum SocialProfile_Community\b",
            &option_sets.join("socialprofile_community.cs")
        ),
        1
    );
    assert_eq!(
        count_in_file(
            r"public enum SocialActivity_PriorityCode\b",
            &option_sets.join("socialactivity_prioritycode.cs")
        ),
        1
    );
    assert_eq!(count_matches(r"public enum SocialProfile_Community\b", dir), 1);

    assert!(dir.join("Actions").join("new_FlagProfileRequest.cs").exists());
}

#[test]
fn test_not_generating_any_optionsets() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path();
    generate(social_group(dir, false, false));

    assert_eq!(count_matches(r"public enum SocialProfile_Community\b", dir), 0);
    assert_eq!(count_matches(r"public enum SocialActivity_PriorityCode\b", dir), 0);
    assert!(!dir.join("optionsets.cs").exists());

    let entities = dir.join("entities.cs");
    assert_eq!(count_in_file(r"public partial class SocialProfile\b", &entities), 1);
    assert_eq!(count_in_file(r"public partial class SocialActivity\b", &entities), 1);

    // Choice attributes fall back to their numeric value
    let contents = fs::read_to_string(&entities).unwrap();
    assert!(contents.contains("public int? Community { get; set; }"));
    assert!(contents.contains("public int? PriorityCode { get; set; }"));
}

#[test]
fn test_not_generating_any_optionsets_one_type_per_file() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path();
    generate(social_group(dir, false, true));

    assert!(!dir.join("entities.cs").exists());
    assert_eq!(
        count_in_file(
            r"public partial class SocialProfile\b",
            &dir.join("Entities").join("SocialProfile.cs")
        ),
        1
    );
    assert!(dir.join("Entities").join("SocialActivity.cs").exists());

    assert!(!dir.join("OptionSets").exists());
    assert!(!dir.join("OptionSets").join("socialprofile_community.cs").exists());
}

#[test]
fn test_generate_from_yaml_resolves_paths_from_config_dir() {
    let temp = TempDir::new().unwrap();
    let config_path = temp.path().join("earlybound.yaml");
    fs::write(
        &config_path,
        r#"
file_path: generated
earlyboundtypes:
  - entities: socialprofile,socialactivity
    generate_optionset_enums: true
    class_namespace: Contoso.Social
"#,
    )
    .unwrap();

    let report =
        generate_from_yaml(&config_path, Path::new(FIXTURE_DIR).join("metadata.yaml")).unwrap();
    assert_eq!(report.entities, 2);
    assert_eq!(report.option_sets, 2);
    assert_eq!(report.actions, 1);

    let entities = temp.path().join("generated").join("entities.cs");
    let contents = fs::read_to_string(&entities).unwrap();
    assert!(contents.starts_with("// <auto-generated>"));
    assert!(contents.contains("namespace Contoso.Social\n{\n"));
    assert!(contents.contains("    public partial class SocialProfile\n"));
}

#[test]
fn test_unwritable_output_directory() {
    let temp = TempDir::new().unwrap();
    // A plain file where the Entities directory should go
    fs::write(temp.path().join("Entities"), "").unwrap();

    let config = GenerationConfig {
        groups: vec![social_group(temp.path(), true, true)],
    };
    let err = generate_all_from_config(&config, &fixture_adapter(), &mut DiskStore).unwrap_err();

    match err {
        GenerationError::OutputWrite { path, .. } => {
            assert!(path.starts_with(temp.path().join("Entities")));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_failed_fetch_writes_nothing() {
    let temp = TempDir::new().unwrap();
    let mut group = social_group(temp.path(), true, false);
    group.entities.push("nosuchentity".to_string());

    let config = GenerationConfig { groups: vec![group] };
    let err = generate_all_from_config(&config, &fixture_adapter(), &mut DiskStore).unwrap_err();

    assert!(matches!(err, GenerationError::MetadataFetch { ref selector, .. } if selector == "nosuchentity"));
    assert!(files_under(temp.path()).is_empty());
}
