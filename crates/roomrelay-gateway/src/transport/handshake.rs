//! Origin guard (pre-upgrade).
//!
//! Rejects browser upgrades whose `Origin` is not in `relay.allowed_origins`
//! before any session state is created. `*` admits every origin. Requests
//! without an `Origin` header (non-browser clients) are admitted.

#[derive(Debug, Clone)]
pub struct OriginPolicy {
    any: bool,
    allowed: Vec<String>,
}

impl OriginPolicy {
    pub fn new(allowed: &[String]) -> Self {
        let any = allowed.iter().any(|o| o == "*");
        let allowed = allowed
            .iter()
            .filter(|o| o.as_str() != "*")
            .map(|o| o.trim_end_matches('/').to_ascii_lowercase())
            .collect();
        Self { any, allowed }
    }

    pub fn allows(&self, origin: Option<&str>) -> bool {
        if self.any {
            return true;
        }
        match origin {
            None => true,
            Some(o) => {
                let o = o.trim_end_matches('/').to_ascii_lowercase();
                self.allowed.iter().any(|a| *a == o)
            }
        }
    }
}
