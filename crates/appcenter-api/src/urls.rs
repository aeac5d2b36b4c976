//! Portal URLs
//!
//! Built locally, without a request. Production portal only.

use crate::types::OwnerType;

const PORTAL_URL: &str = "https://appcenter.ms";
const INSTALL_URL: &str = "https://install.appcenter.ms";

/// Release page in the App Center portal
pub fn release_url(owner_type: OwnerType, owner_name: &str, app_name: &str, release_id: u64) -> String {
    format!(
        "{}/{}/{}/apps/{}/distribute/releases/{}",
        PORTAL_URL,
        owner_type.portal_segment(),
        owner_name,
        app_name,
        release_id
    )
}

/// Public install page
pub fn install_url(owner_type: OwnerType, owner_name: &str, app_name: &str) -> String {
    format!(
        "{}/{}/{}/apps/{}",
        INSTALL_URL,
        owner_type.portal_segment(),
        owner_name,
        app_name
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_url() {
        assert_eq!(
            release_url(OwnerType::User, "owner", "app", 42),
            "https://appcenter.ms/users/owner/apps/app/distribute/releases/42"
        );
        assert_eq!(
            release_url(OwnerType::Organization, "acme", "app", 1),
            "https://appcenter.ms/orgs/acme/apps/app/distribute/releases/1"
        );
    }

    #[test]
    fn test_install_url() {
        assert_eq!(
            install_url(OwnerType::User, "owner", "app"),
            "https://install.appcenter.ms/users/owner/apps/app"
        );
        assert_eq!(
            install_url(OwnerType::Organization, "acme", "app"),
            "https://install.appcenter.ms/orgs/acme/apps/app"
        );
    }
}
