//! Step parsing and replay.

use std::io::Write;

use statebind::prelude::{Page, PageConfig, UserInput};

use crate::error::{DemoError, Result};

/// Parse `press:TARGET`, `release:TARGET` or `text:TARGET=VALUE`.
///
/// `VALUE` may be empty and may contain `=`; only the first `=` splits.
pub fn parse_step(input: &str) -> Result<UserInput> {
    let (kind, rest) = input
        .split_once(':')
        .ok_or_else(|| DemoError::invalid_step(input, "expected KIND:TARGET"))?;
    let step = match kind.trim() {
        "press" => UserInput::press(target(input, rest)?),
        "release" => UserInput::release(target(input, rest)?),
        "text" => {
            let (name, value) = rest
                .split_once('=')
                .ok_or_else(|| DemoError::invalid_step(input, "expected text:TARGET=VALUE"))?;
            UserInput::text(target(input, name)?, value)
        }
        _ => return Err(DemoError::invalid_step(input, "unknown kind")),
    };
    Ok(step)
}

fn target<'a>(input: &str, raw: &'a str) -> Result<&'a str> {
    let target = raw.trim();
    if target.is_empty() {
        Err(DemoError::invalid_step(input, "empty target"))
    } else {
        Ok(target)
    }
}

/// A mounted page driven by scripted input.
#[derive(Debug)]
pub struct Session {
    page: Page,
}

impl Session {
    pub fn new(config: &PageConfig) -> Result<Self> {
        let mut page = Page::from_config(config)?;
        page.mount()?;
        tracing::info!(
            strategy = %page.strategy_kind(),
            bindings = page.binder().bindings().len(),
            "session mounted"
        );
        Ok(Self { page })
    }

    #[must_use]
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Dispatch one step and return the bindings it evaluated.
    pub fn step(&mut self, input: &UserInput) -> Result<u64> {
        let report = self.page.dispatch(input)?;
        match report {
            Some(report) => Ok(report.evaluations),
            None => {
                tracing::debug!(%input, "no handler for input");
                Ok(0)
            }
        }
    }

    /// Parse every step up front, then replay them, writing the view after
    /// mount and after each step, followed by refresh totals.
    pub fn replay(&mut self, steps: &[String], out: &mut impl Write) -> Result<()> {
        let inputs = steps
            .iter()
            .map(|s| parse_step(s))
            .collect::<Result<Vec<_>>>()?;

        writeln!(out, "# mount ({})", self.page.strategy_kind())?;
        write!(out, "{}", self.page.render_html())?;

        for input in &inputs {
            let evaluations = self.step(input)?;
            writeln!(out, "# {input} (evaluated {evaluations})")?;
            write!(out, "{}", self.page.render_html())?;
        }

        let stats = self.page.binder().stats();
        writeln!(
            out,
            "# refresh calls: {}, evaluations: {}, node writes: {}",
            stats.refresh_calls, stats.evaluations, stats.node_writes
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_steps() {
        assert_eq!(parse_step("press:inc").unwrap(), UserInput::press("inc"));
        assert_eq!(parse_step("release: b ").unwrap(), UserInput::release("b"));
        assert_eq!(
            parse_step("text:name=a=b").unwrap(),
            UserInput::text("name", "a=b")
        );
        assert_eq!(parse_step("text:name=").unwrap(), UserInput::text("name", ""));
    }

    #[test]
    fn rejects_bad_steps() {
        for bad in ["inc", "hover:inc", "press:", "text:name", "text:=x"] {
            let err = parse_step(bad).unwrap_err();
            assert!(matches!(err, DemoError::InvalidStep { .. }), "{bad}");
            assert_eq!(err.exit_code(), 2);
        }
    }

    #[test]
    fn default_counter_replay() {
        let mut session = Session::new(&PageConfig::counter()).unwrap();
        let mut out = Vec::new();
        session
            .replay(&vec!["press:inc".to_owned(); 3], &mut out)
            .unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.starts_with("# mount (explicit)\n"));
        assert!(out.contains("# press:inc (evaluated"));
        assert!(out.contains("Count: 3"));
        assert!(out.contains("# refresh calls:"));
    }

    #[test]
    fn unhandled_input_evaluates_nothing() {
        let mut session = Session::new(&PageConfig::counter()).unwrap();
        assert_eq!(session.step(&UserInput::press("nowhere")).unwrap(), 0);
    }

    #[test]
    fn bad_step_fails_before_any_dispatch() {
        let mut session = Session::new(&PageConfig::counter()).unwrap();
        let mut out = Vec::new();
        let steps = vec!["press:inc".to_owned(), "bogus".to_owned()];
        assert!(session.replay(&steps, &mut out).is_err());
        assert!(out.is_empty());
        assert_eq!(session.page().store().get("num").unwrap().to_string(), "0");
    }
}
