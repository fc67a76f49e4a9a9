use super::ImportRequest;
use crate::error::{ImportError, Result};
use crate::registry::types::{NewProvider, NewToken, Provider, Token};
use crate::registry::RegistryClient;
use tracing::debug;

/// Loads the token named by `tokenId`, or stores the request's token as a new
/// one. Omitting `tokenId` always creates.
pub async fn resolve_token(registry: &dyn RegistryClient, req: &ImportRequest) -> Result<Token> {
    let token = if req.token_id != 0 {
        registry
            .get_token(req.token_id)
            .await
            .map_err(|e| ImportError::Read(format!("get token {}: {e}", req.token_id)))?
            .ok_or_else(|| ImportError::NotFound(format!("token with ID {}", req.token_id)))?
    } else {
        let new_token = NewToken {
            token: req.token.clone(),
            user_name: req.user.clone(),
        };
        registry
            .create_token(&new_token)
            .await
            .map_err(|e| ImportError::Write(format!("create token for user {:?}: {e}", req.user)))?
            .ok_or_else(|| {
                ImportError::EmptyResult(format!("registry returned no token for user {:?}", req.user))
            })?
    };

    debug!(token_id = token.id, "resolved token");
    Ok(token)
}

/// Loads the provider named by `providerId` and checks it points at the
/// request's endpoint, or creates a provider row of kind `kind`.
pub async fn resolve_provider(
    registry: &dyn RegistryClient,
    req: &ImportRequest,
    token: &Token,
    kind: &str,
) -> Result<Provider> {
    let provider = if req.provider_id != 0 {
        let provider = registry
            .get_provider(req.provider_id)
            .await
            .map_err(|e| ImportError::Read(format!("get provider {}: {e}", req.provider_id)))?
            .ok_or_else(|| ImportError::NotFound(format!("provider with ID {}", req.provider_id)))?;

        if provider.url != req.url {
            return Err(ImportError::Validation(format!(
                "provider {} has url {:?}, request has {:?}",
                provider.id, provider.url, req.url
            )));
        }
        if provider.upload_url != req.upload_url {
            return Err(ImportError::Validation(format!(
                "provider {} has upload url {:?}, request has {:?}",
                provider.id, provider.upload_url, req.upload_url
            )));
        }
        provider
    } else {
        let new_provider = NewProvider {
            name: kind.to_string(),
            url: req.url.clone(),
            upload_url: req.upload_url.clone(),
            token_id: token.id,
        };
        registry
            .create_provider(&new_provider)
            .await
            .map_err(|e| ImportError::Write(format!("create {kind} provider for {:?}: {e}", req.url)))?
            .ok_or_else(|| {
                ImportError::EmptyResult(format!("registry returned no provider for {:?}", req.url))
            })?
    };

    debug!(provider_id = provider.id, provider_name = %provider.name, "resolved provider");
    Ok(provider)
}
