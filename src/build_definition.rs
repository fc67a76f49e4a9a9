use crate::provider::ProviderClient;
use tracing::debug;

pub const BUILD_DEFINITION_FILE: &str = ".wharf-ci.yml";

/// Reads the build definition from the default branch. Any failure yields an
/// empty string: a repository without one is still imported.
pub async fn fetch(client: &dyn ProviderClient, owner: &str, name: &str) -> String {
    match client
        .get_file_contents(owner, name, BUILD_DEFINITION_FILE)
        .await
    {
        Ok(contents) => contents,
        Err(e) => {
            debug!(repo = %format!("{owner}/{name}"), error = %e, "no build definition");
            String::new()
        }
    }
}
