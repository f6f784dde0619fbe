use crate::errors::AppResult;

/// Client config from the ambient kubeconfig or in-cluster environment.
pub async fn infer_config() -> AppResult<kube::Config> {
    let config = kube::Config::infer().await?;
    Ok(config)
}

pub fn make_client(config: kube::Config) -> AppResult<kube::Client> {
    let client = kube::Client::try_from(config)?;
    Ok(client)
}

/// `--namespace` wins, otherwise the kubeconfig context's namespace.
pub fn resolve_namespace(flag: Option<&str>, config: &kube::Config) -> String {
    match flag {
        Some(ns) => ns.to_string(),
        None => config.default_namespace.clone(),
    }
}
