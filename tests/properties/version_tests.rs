use proptest::prelude::*;

use addonrepo::addon::{AddonVersion, ArchiveName, archive_file_name};

fn arb_components() -> impl Strategy<Value = Vec<u64>> {
    prop::collection::vec(0u64..2000, 1..5)
}

fn render(components: &[u64]) -> String {
    components
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(".")
}

proptest! {
    #[test]
    fn ordering_follows_numeric_components(a in arb_components(), b in arb_components()) {
        let left = AddonVersion::parse(&render(&a)).unwrap();
        let right = AddonVersion::parse(&render(&b)).unwrap();
        prop_assert_eq!(left.cmp(&right), a.cmp(&b));
    }

    #[test]
    fn parse_keeps_raw_text(components in arb_components(), tail in "(\\+[a-z]{1,6}(\\.[0-9]{1,2})?)?") {
        let raw = format!("{}{tail}", render(&components));
        let version = AddonVersion::parse(&raw).unwrap();
        prop_assert_eq!(version.to_string(), raw);
        prop_assert_eq!(version.components(), components.as_slice());
    }

    #[test]
    fn archive_names_sort_newest_first(mut versions in prop::collection::vec(arb_components(), 1..8)) {
        let mut names: Vec<ArchiveName> = versions
            .iter()
            .map(|components| {
                let version = AddonVersion::parse(&render(components)).unwrap();
                ArchiveName::parse("plugin.a", &archive_file_name("plugin.a", &version)).unwrap()
            })
            .collect();
        names.sort_by(|a, b| b.cmp(a));
        versions.sort_by(|a, b| b.cmp(a));

        let sorted: Vec<Vec<u64>> = names
            .iter()
            .map(|name| name.version.as_ref().unwrap().components().to_vec())
            .collect();
        prop_assert_eq!(sorted, versions);
    }

    #[test]
    fn unversioned_names_sort_below_versioned(components in arb_components(), junk in "[a-z]{1,8}") {
        let version = AddonVersion::parse(&render(&components)).unwrap();
        let versioned =
            ArchiveName::parse("plugin.a", &archive_file_name("plugin.a", &version)).unwrap();
        let unversioned = ArchiveName::parse("plugin.a", &format!("{junk}.zip")).unwrap();
        prop_assert!(unversioned < versioned);
    }
}

#[test]
fn documented_examples() {
    let v = |s: &str| AddonVersion::parse(s).unwrap();
    assert!(v("1.10.0") > v("1.9.0"));
    assert!(v("1.10.0") > v("1.2.33"));
    assert!(v("1.9.0") > v("1.2.33"));
}
