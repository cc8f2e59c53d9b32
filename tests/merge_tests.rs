//! Merge engine tests on real directory trees.
//!
//! Each test lays out decompiled trees by hand and runs one merge step, the
//! way the pipeline does after decompiling.

mod helpers;

use helpers::{
    assert_file_contains, assert_file_eq, assert_file_exists, assert_not_exists, write_apktool_yml,
    write_file, TestEnv,
};
use std::fs;
use std::path::Path;
use xapk2apk::bundle::prioritize;
use xapk2apk::merge::{
    merge_architecture, merge_assets, merge_exemptions, merge_resources, merge_variant,
    read_exemptions, standaloneify, write_exemptions, MergePlan,
};
use xapk2apk::{Error, Role, Variant, VariantSet};

fn names(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// =============================================================================
// doNotCompress block
// =============================================================================

#[test]
fn test_exemption_merge_is_idempotent() {
    let env = TestEnv::new();
    let main = env.path("base");
    let split = env.path("config.de");
    write_apktool_yml(&main, &["png", "arsc"]);
    write_apktool_yml(&split, &["arsc", "assets/assetpack/a.bin"]);

    merge_exemptions(&main.join("apktool.yml"), &split.join("apktool.yml")).unwrap();
    let once = fs::read_to_string(main.join("apktool.yml")).unwrap();
    merge_exemptions(&main.join("apktool.yml"), &split.join("apktool.yml")).unwrap();
    let twice = fs::read_to_string(main.join("apktool.yml")).unwrap();

    assert_eq!(once, twice);
    assert_eq!(
        read_exemptions(&main.join("apktool.yml")).unwrap().exemptions(),
        ["- arsc", "- assets/assetpack/a.bin", "- png"]
    );
    // Source is never written
    assert_file_contains(&split.join("apktool.yml"), "- arsc\n- assets/assetpack/a.bin\n");
}

#[test]
fn test_exemption_merge_preserves_surrounding_lines() {
    let env = TestEnv::new();
    let config = env.path("base/apktool.yml");
    let text = "version: 2.9.3\napkFileName: base.apk\ndoNotCompress:\n- resources.arsc\nisFrameworkApk: false\nsdkInfo:\n  minSdkVersion: 21\n";
    write_file(&config, text);

    write_exemptions(&config, names(&["- webp", "- resources.arsc"])).unwrap();

    assert_file_eq(
        &config,
        "version: 2.9.3\napkFileName: base.apk\ndoNotCompress:\n- resources.arsc\n- webp\nisFrameworkApk: false\nsdkInfo:\n  minSdkVersion: 21\n",
    );
}

#[test]
fn test_exemption_block_at_end_of_file() {
    let env = TestEnv::new();
    let config = env.path("base/apktool.yml");
    write_file(&config, "version: 2.9.3\ndoNotCompress:\n- png");

    write_exemptions(&config, names(&["- arsc", "- png"])).unwrap();

    assert_file_eq(&config, "version: 2.9.3\ndoNotCompress:\n- arsc\n- png");
}

#[test]
fn test_exemption_merge_keeps_crlf_line_endings() {
    let env = TestEnv::new();
    let target = env.path("base/apktool.yml");
    let source = env.path("config.arm64_v8a/apktool.yml");
    write_file(
        &target,
        "apkFileName: base.apk\r\ndoNotCompress:\r\n- arsc\r\nversion: 2.9.3\r\n",
    );
    write_file(&source, "doNotCompress:\r\n- so\r\n");

    merge_exemptions(&target, &source).unwrap();

    assert_file_eq(
        &target,
        "apkFileName: base.apk\r\ndoNotCompress:\r\n- arsc\r\n- so\r\nversion: 2.9.3\r\n",
    );
}

#[test]
fn test_exemption_write_without_block_fails() {
    let env = TestEnv::new();
    let config = env.path("base/apktool.yml");
    write_file(&config, "version: 2.9.3\n");

    let err = write_exemptions(&config, names(&["- arsc"])).unwrap_err();

    assert!(matches!(
        err.downcast_ref::<Error>(),
        Some(Error::MissingExemptionBlock(_))
    ));
    assert_file_eq(&config, "version: 2.9.3\n");
}

// =============================================================================
// Tree merges
// =============================================================================

#[test]
fn test_resource_merge_never_overwrites() {
    let env = TestEnv::new();
    let main = env.path("base");
    let split = env.path("config.hdpi");
    write_file(&main.join("res/values/strings.xml"), "main");
    write_file(&split.join("res/values/strings.xml"), "split");
    write_file(&split.join("res/values/public.xml"), "split ids");
    write_file(&split.join("res/drawable-hdpi-v4/icon.png"), "icon");

    let stats = merge_resources(&main, &split).unwrap();

    assert_file_eq(&main.join("res/values/strings.xml"), "main");
    assert_file_eq(&main.join("res/drawable-hdpi-v4/icon.png"), "icon");
    assert_not_exists(&main.join("res/values/public.xml"));
    assert_eq!(stats.copied, 1);
    assert_eq!(stats.conflicts, 1);
    assert_eq!(stats.local_skipped, 1);
}

#[test]
fn test_resource_merge_without_res_is_noop() {
    let env = TestEnv::new();
    let main = env.path("base");
    let split = env.path("config.en");
    fs::create_dir_all(&main).unwrap();
    fs::create_dir_all(&split).unwrap();

    let stats = merge_resources(&main, &split).unwrap();

    assert_eq!(stats.copied, 0);
    assert_not_exists(&main.join("res"));
}

#[test]
fn test_architecture_merge_copies_lib_tree_and_exemptions() {
    let env = TestEnv::new();
    let main = env.path("base");
    let split = env.path("config.arm64_v8a");
    write_apktool_yml(&main, &["arsc"]);
    write_apktool_yml(&split, &["lib/arm64-v8a/libfoo.so"]);
    write_file(&split.join("lib/arm64-v8a/libfoo.so"), "elf");
    write_file(&split.join("lib/arm64-v8a/sub/libbar.so"), "elf");

    let stats = merge_architecture(&main, &split).unwrap();

    assert_eq!(stats.copied, 2);
    assert_file_exists(&main.join("lib/arm64-v8a/libfoo.so"));
    assert_file_exists(&main.join("lib/arm64-v8a/sub/libbar.so"));
    assert_file_contains(
        &main.join("apktool.yml"),
        "doNotCompress:\n- arsc\n- lib/arm64-v8a/libfoo.so\n",
    );
}

#[test]
fn test_architecture_merge_refuses_existing_abi() {
    let env = TestEnv::new();
    let main = env.path("base");
    let split = env.path("config.x86");
    write_apktool_yml(&main, &[]);
    write_apktool_yml(&split, &[]);
    write_file(&main.join("lib/x86/libfoo.so"), "base");
    write_file(&split.join("lib/x86/libfoo.so"), "split");

    assert!(merge_architecture(&main, &split).is_err());
    assert_file_eq(&main.join("lib/x86/libfoo.so"), "base");
}

#[test]
fn test_asset_merge_only_takes_asset_packs() {
    let env = TestEnv::new();
    let main = env.path("base");
    let split = env.path("config.de");
    write_apktool_yml(&main, &["arsc"]);
    write_apktool_yml(&split, &["assets/assetpack/de/voice.bin"]);
    write_file(&split.join("assets/assetpack/de/voice.bin"), "stimme");
    write_file(&split.join("assets/other.txt"), "ignored");

    merge_assets(&main, &split).unwrap();

    assert_file_eq(&main.join("assets/assetpack/de/voice.bin"), "stimme");
    assert_not_exists(&main.join("assets/other.txt"));
    assert_file_contains(&main.join("apktool.yml"), "- assets/assetpack/de/voice.bin\n");
}

#[test]
fn test_locale_without_asset_pack_leaves_exemptions_alone() {
    let env = TestEnv::new();
    let main = env.path("base");
    let split = env.path("config.fr");
    write_apktool_yml(&main, &["arsc"]);
    write_apktool_yml(&split, &["png"]);
    write_file(&split.join("res/values-fr/strings.xml"), "bonjour");

    let variant = Variant::new(&env.base_dir, "config.fr.apk", Role::Locale);
    merge_variant(&main, &variant).unwrap();

    assert_file_eq(&main.join("res/values-fr/strings.xml"), "bonjour");
    assert!(!fs::read_to_string(main.join("apktool.yml"))
        .unwrap()
        .contains("- png"));
}

// =============================================================================
// Ordering
// =============================================================================

#[test]
fn test_density_priority_with_unknown_qualifier() {
    let variants: Vec<Variant> = ["config.mdpi.apk", "config.unknownqualifier.apk", "config.xxhdpi.apk"]
        .iter()
        .map(|name| Variant::new(Path::new("/w"), name, Role::Density))
        .collect();

    let order: Vec<String> = prioritize(variants)
        .into_iter()
        .map(|v| v.dir_name)
        .collect();

    assert_eq!(order, ["config.xxhdpi", "config.mdpi", "config.unknownqualifier"]);
}

#[test]
fn test_plan_applies_higher_density_first() {
    let env = TestEnv::new();
    let work = &env.base_dir;
    write_apktool_yml(&work.join("base"), &[]);
    write_file(&work.join("config.ldpi/res/drawable/logo.png"), "ldpi");
    write_file(&work.join("config.xhdpi/res/drawable/logo.png"), "xhdpi");

    let set = VariantSet::classify(
        work,
        &names(&["config.ldpi.apk", "base.apk", "config.xhdpi.apk"]),
        "com.example.app",
    )
    .unwrap();
    let stats = MergePlan::new(&set).apply().unwrap();

    assert_file_eq(&work.join("base/res/drawable/logo.png"), "xhdpi");
    assert_eq!(stats.copied, 1);
    assert_eq!(stats.conflicts, 1);
}

// =============================================================================
// Manifest
// =============================================================================

#[test]
fn test_manifest_patch_twice_is_same_as_once() {
    let env = TestEnv::new();
    let manifest = env.path("base/AndroidManifest.xml");
    write_file(
        &manifest,
        r#"<application android:isSplitRequired="true" android:label="x"><meta-data android:name="com.android.vending.splits.required" android:value="true"/></application>"#,
    );

    assert!(standaloneify(&manifest).unwrap());
    let once = fs::read_to_string(&manifest).unwrap();
    assert!(!standaloneify(&manifest).unwrap());

    assert_file_eq(&manifest, &once);
    assert_eq!(once, r#"<application android:label="x"></application>"#);
}
