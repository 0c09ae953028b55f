//! Built-in blocklist catalog.
//!
//! Lists that can be enabled by id alone; a per-list config table without
//! a `url` falls back to the entry here.

use std::collections::HashMap;

/// Describes a built-in blocklist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub url: &'static str,
    pub category: &'static str,
    pub description: &'static str,
    /// Requires a paid subscription (and therefore auth configuration)
    pub paid: bool,
}

/// The built-in blocklists available for selection by id.
pub fn catalog() -> HashMap<&'static str, ListDefinition> {
    CATALOG.iter().map(|def| (def.id, *def)).collect()
}

const CATALOG: &[ListDefinition] = &[
    ListDefinition {
        id: "blocklistproject_malware",
        name: "Block List Project - Malware",
        url: "https://blocklistproject.github.io/Lists/malware.txt",
        category: "malware",
        description: "Hosts associated with malware distribution.",
        paid: false,
    },
    ListDefinition {
        id: "blocklistproject_phishing",
        name: "Block List Project - Phishing",
        url: "https://blocklistproject.github.io/Lists/phishing.txt",
        category: "phishing",
        description: "Hosts associated with phishing campaigns.",
        paid: false,
    },
    ListDefinition {
        id: "blocklistproject_scam",
        name: "Block List Project - Scam",
        url: "https://blocklistproject.github.io/Lists/scam.txt",
        category: "scam",
        description: "Hosts associated with scam activity.",
        paid: false,
    },
    ListDefinition {
        id: "blocklistproject_porn",
        name: "Block List Project - Porn",
        url: "https://blocklistproject.github.io/Lists/porn.txt",
        category: "porn",
        description: "Hosts associated with adult content.",
        paid: false,
    },
    ListDefinition {
        id: "blocklistproject_ads",
        name: "Block List Project - Ads",
        url: "https://blocklistproject.github.io/Lists/ads.txt",
        category: "ads",
        description: "Advertising and tracking hosts.",
        paid: false,
    },
    ListDefinition {
        id: "stevenblack_adult",
        name: "StevenBlack - Porn Only",
        url: "https://raw.githubusercontent.com/StevenBlack/hosts/master/alternates/porn-only/hosts",
        category: "porn",
        description: "Adult content list without ad/tracker blocking.",
        paid: false,
    },
    ListDefinition {
        id: "oisd_basic",
        name: "OISD Basic",
        url: "https://big.oisd.nl/",
        category: "ads",
        description: "Ad and tracker blocking list.",
        paid: false,
    },
    ListDefinition {
        id: "adguard_dns",
        name: "AdGuard DNS Filter",
        url: "https://adguardteam.github.io/AdGuardSDNSFilter/Filters/filter.txt",
        category: "ads",
        description: "Ad and tracker blocking list.",
        paid: false,
    },
    ListDefinition {
        id: "spamhaus_dbl",
        name: "Spamhaus DBL",
        url: "https://www.spamhaus.org/blocklists/domain-blocklist/",
        category: "malware",
        description: "Paid domain blocklist from Spamhaus.",
        paid: true,
    },
    ListDefinition {
        id: "surbl",
        name: "SURBL",
        url: "https://www.surbl.org/",
        category: "malware",
        description: "Paid URL blocklist from SURBL.",
        paid: true,
    },
];
