//! URL slug helpers.
//!
//! Posts, categories, shows and podcasts are addressed by slug on the public
//! site, and usernames for OAuth sign-ups are derived the same way. Uniqueness
//! is checked through an async predicate so the helpers stay independent of
//! the repository.

use std::future::Future;

use slug::slugify;

use crate::error::{AppError, AppResult};

const MAX_SUFFIX_ATTEMPTS: usize = 100;

/// Derive the base slug for a human-readable title.
pub fn derive_slug(input: &str) -> AppResult<String> {
    let candidate = slugify(input.trim());
    if candidate.is_empty() {
        return Err(AppError::validation(format!(
            "cannot derive a slug from `{}`",
            input
        )));
    }
    Ok(candidate)
}

/// create_unique_slug
///
/// Tries `base`, then `base-1`, `base-2`, ... against the `exists` predicate and
/// returns the first free candidate. Gives up with a conflict after a fixed number
/// of attempts.
pub async fn create_unique_slug<F, Fut>(input: &str, mut exists: F) -> AppResult<String>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = AppResult<bool>>,
{
    let base = derive_slug(input)?;
    unique_from_base(base, '-', &mut exists).await
}

/// Username variant: `alice.smith@example.com` becomes `alice_smith`, then
/// `alice_smith_1`, ... until `exists` reports a free name.
pub async fn create_unique_username<F, Fut>(email: &str, mut exists: F) -> AppResult<String>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = AppResult<bool>>,
{
    let local = email.split('@').next().unwrap_or_default();
    let mut base = slugify(local).replace('-', "_");
    if base.len() < 3 {
        base = format!("listener_{}", base).trim_end_matches('_').to_string();
    }
    base.truncate(24);
    unique_from_base(base, '_', &mut exists).await
}

async fn unique_from_base<F, Fut>(base: String, separator: char, exists: &mut F) -> AppResult<String>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = AppResult<bool>>,
{
    if !exists(base.clone()).await? {
        return Ok(base);
    }

    // The bare base counts as the first attempt.
    for attempt in 1..MAX_SUFFIX_ATTEMPTS {
        let candidate = format!("{base}{separator}{attempt}");
        if !exists(candidate.clone()).await? {
            return Ok(candidate);
        }
    }

    Err(AppError::conflict(format!(
        "no free slug left for `{}`",
        base
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn taken(slugs: &[&str]) -> HashSet<String> {
        slugs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn derives_lowercase_dashed_slug() {
        assert_eq!(
            derive_slug("  Morning Show: Live!  ").unwrap(),
            "morning-show-live"
        );
    }

    #[test]
    fn rejects_symbol_only_titles() {
        assert!(matches!(derive_slug("!!!"), Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn free_base_is_used_as_is() {
        let existing = taken(&[]);
        let slug = create_unique_slug("Hello World", |s| {
            let hit = existing.contains(&s);
            async move { Ok::<_, AppError>(hit) }
        })
        .await
        .unwrap();
        assert_eq!(slug, "hello-world");
    }

    #[tokio::test]
    async fn collisions_get_sequential_suffix() {
        let existing = taken(&["hello-world", "hello-world-1", "hello-world-2"]);
        let slug = create_unique_slug("Hello World", |s| {
            let hit = existing.contains(&s);
            async move { Ok::<_, AppError>(hit) }
        })
        .await
        .unwrap();
        assert_eq!(slug, "hello-world-3");
    }

    #[tokio::test]
    async fn exhaustion_is_a_conflict() {
        let result = create_unique_slug("Busy", |_| async { Ok::<_, AppError>(true) }).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let lookups = std::cell::Cell::new(0);
        let mut last = String::new();
        let result = create_unique_slug("Busy", |s| {
            lookups.set(lookups.get() + 1);
            last = s;
            async { Ok::<_, AppError>(true) }
        })
        .await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
        assert_eq!(lookups.get(), MAX_SUFFIX_ATTEMPTS);
        assert_eq!(last, format!("busy-{}", MAX_SUFFIX_ATTEMPTS - 1));
    }

    #[tokio::test]
    async fn predicate_errors_propagate() {
        let result =
            create_unique_slug("Busy", |_| async { Err::<bool, _>(AppError::Internal("db".into())) }).await;
        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[tokio::test]
    async fn usernames_use_underscores() {
        let existing = taken(&["dj_sam"]);
        let name = create_unique_username("DJ.Sam@radio.fm", |s| {
            let hit = existing.contains(&s);
            async move { Ok::<_, AppError>(hit) }
        })
        .await
        .unwrap();
        assert_eq!(name, "dj_sam_1");
    }

    #[tokio::test]
    async fn short_local_parts_are_padded() {
        let name = create_unique_username("a@b.c", |_| async { Ok::<_, AppError>(false) })
            .await
            .unwrap();
        assert_eq!(name, "listener_a");
    }
}
