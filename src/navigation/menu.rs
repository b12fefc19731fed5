use super::permissions::{AccountClass, Permission, RequiredPermission};
use serde::{Deserialize, Serialize};

/// Dashboard area a menu item opens.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum Section {
    Dashboard,
    Members,
    Campaigns,
    Donations,
    Events,
    Subscriptions,
    Organization,
}

impl Section {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::Members => "members",
            Self::Campaigns => "campaigns",
            Self::Donations => "donations",
            Self::Events => "events",
            Self::Subscriptions => "subscriptions",
            Self::Organization => "organization",
        }
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuItem {
    pub icon: &'static str,
    pub label: &'static str,
    pub section: Section,
    pub description: &'static str,
    pub required_permission: Option<RequiredPermission>,
}

impl MenuItem {
    pub fn is_visible_to(&self, grants: &[Permission]) -> bool {
        self.required_permission
            .is_none_or(|need| need.is_granted(grants))
    }
}

pub const MENU_ITEMS: &[MenuItem] = &[
    MenuItem {
        icon: "◆",
        label: "Dashboard",
        section: Section::Dashboard,
        description: "Overview of your organization",
        required_permission: None,
    },
    MenuItem {
        icon: "●",
        label: "Members",
        section: Section::Members,
        description: "Manage members and volunteers",
        required_permission: Some(RequiredPermission::new("members", "get")),
    },
    MenuItem {
        icon: "▲",
        label: "Campaigns",
        section: Section::Campaigns,
        description: "Fundraising campaigns",
        required_permission: Some(RequiredPermission::new("campaigns", "get")),
    },
    MenuItem {
        icon: "$",
        label: "Donations",
        section: Section::Donations,
        description: "Donations and receipts",
        required_permission: Some(RequiredPermission::new("donations", "get")),
    },
    MenuItem {
        icon: "■",
        label: "Events",
        section: Section::Events,
        description: "Events and ticketing",
        required_permission: Some(RequiredPermission::new("events", "get")),
    },
    MenuItem {
        icon: "↻",
        label: "Subscriptions",
        section: Section::Subscriptions,
        description: "Recurring plans and subscribers",
        required_permission: Some(RequiredPermission::new("subscriptions", "get")),
    },
    MenuItem {
        icon: "⚙",
        label: "Organization",
        section: Section::Organization,
        description: "Organization settings",
        required_permission: Some(RequiredPermission::new("organization", "put")),
    },
];

/// Items the user may see, in menu order.
///
/// A privileged account with no grants at all sees every item.
pub fn filter_menu<'a>(
    items: &'a [MenuItem],
    grants: &[Permission],
    account_class: AccountClass,
) -> Vec<&'a MenuItem> {
    if grants.is_empty() && account_class.is_privileged() {
        return items.iter().collect();
    }
    items
        .iter()
        .filter(|item| item.is_visible_to(grants))
        .collect()
}

/// The requested section when it is visible, otherwise the first visible one.
pub fn resolve_active_section(
    visible: &[&MenuItem],
    requested: Option<Section>,
) -> Option<Section> {
    if let Some(section) = requested
        && visible.iter().any(|item| item.section == section)
    {
        return Some(section);
    }
    if let Some(section) = requested {
        tracing::debug!("Section {} is not visible, falling back", section);
    }
    visible.first().map(|item| item.section)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sections(items: &[&MenuItem]) -> Vec<Section> {
        items.iter().map(|i| i.section).collect()
    }

    #[test]
    fn test_campaign_grant_only() {
        let grants = vec![Permission::new("campaigns", "get")];
        let visible = filter_menu(MENU_ITEMS, &grants, AccountClass::Staff);
        assert_eq!(
            sections(&visible),
            vec![Section::Dashboard, Section::Campaigns]
        );
    }

    #[test]
    fn test_privileged_without_grants_sees_all() {
        let visible = filter_menu(MENU_ITEMS, &[], AccountClass::Admin);
        assert_eq!(visible.len(), MENU_ITEMS.len());
    }

    #[test]
    fn test_privileged_with_grants_is_filtered() {
        let grants = vec![Permission::new("events", "GET")];
        let visible = filter_menu(MENU_ITEMS, &grants, AccountClass::Admin);
        assert_eq!(sections(&visible), vec![Section::Dashboard, Section::Events]);
    }

    #[test]
    fn test_staff_without_grants_sees_public_items() {
        let visible = filter_menu(MENU_ITEMS, &[], AccountClass::Staff);
        assert_eq!(sections(&visible), vec![Section::Dashboard]);
    }

    #[test]
    fn test_order_is_preserved() {
        let grants = vec![
            Permission::new("subscriptions", "get"),
            Permission::new("members", "get"),
            Permission::new("donations", "get"),
        ];
        let visible = filter_menu(MENU_ITEMS, &grants, AccountClass::Staff);
        assert_eq!(
            sections(&visible),
            vec![
                Section::Dashboard,
                Section::Members,
                Section::Donations,
                Section::Subscriptions
            ]
        );
    }

    #[test]
    fn test_active_section_fallback() {
        let grants = vec![Permission::new("campaigns", "get")];
        let visible = filter_menu(MENU_ITEMS, &grants, AccountClass::Staff);

        assert_eq!(
            resolve_active_section(&visible, Some(Section::Campaigns)),
            Some(Section::Campaigns)
        );
        assert_eq!(
            resolve_active_section(&visible, Some(Section::Members)),
            Some(Section::Dashboard)
        );
        assert_eq!(
            resolve_active_section(&visible, None),
            Some(Section::Dashboard)
        );
        assert_eq!(resolve_active_section(&[], Some(Section::Events)), None);
    }

    #[test]
    fn test_section_names() {
        assert_eq!(Section::Subscriptions.to_string(), "subscriptions");
        let parsed: Section = serde_json::from_str(r#""donations""#).unwrap();
        assert_eq!(parsed, Section::Donations);
    }
}
