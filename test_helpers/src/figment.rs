//! Helpers for running assertions inside a `figment::Jail`.
//!
//! A jail isolates environment variables and the working directory, which
//! lets tests build static property layers from files and variables without
//! interfering with each other.

use anyhow::{Result, anyhow};

/// Runs `f` inside a [`figment::Jail`] and returns its output.
///
/// The closure may return any error convertible into `anyhow::Error`; it is
/// reported through the jail so the sandbox is torn down before the error
/// reaches the caller.
///
/// # Errors
///
/// Returns an error if the jail cannot be created or the closure fails.
#[expect(
    clippy::result_large_err,
    reason = "figment::Jail::try_with requires closures returning figment::Error"
)]
pub fn in_jail<F, T>(f: F) -> Result<T>
where
    F: FnOnce(&mut figment::Jail) -> Result<T>,
{
    let mut output = None;
    figment::Jail::try_with(|jail| {
        let value = f(jail).map_err(|err| figment::Error::from(format!("{err:#}")))?;
        output = Some(value);
        Ok(())
    })
    .map_err(|err| anyhow!(err.to_string()))?;
    output.ok_or_else(|| anyhow!("jail closure did not return a value"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variables_are_visible_only_inside_the_jail() -> Result<()> {
        let seen = in_jail(|jail| {
            jail.set_env("DYNAMIC_PROPS_JAIL_PROBE", "inside");
            Ok(std::env::var("DYNAMIC_PROPS_JAIL_PROBE")?)
        })?;
        anyhow::ensure!(seen == "inside", "unexpected value {seen}");
        anyhow::ensure!(std::env::var("DYNAMIC_PROPS_JAIL_PROBE").is_err());
        Ok(())
    }

    #[test]
    fn closure_errors_are_reported() {
        let result: Result<()> = in_jail(|_| Err(anyhow!("boom")));
        assert!(result.is_err_and(|err| err.to_string().contains("boom")));
    }
}
