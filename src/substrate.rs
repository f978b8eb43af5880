//! Chromium substrate adapter.
//!
//! Implements the engine's three port seams (probe, driver, control) on a
//! chromiumoxide browser. Probing evaluates a small script that tags each
//! matching DOM node with a synthetic `data-mw-id` attribute and reports
//! geometry; later actions address nodes by that attribute, which keeps
//! text and heuristic matches actionable without a stable selector.

use std::sync::Arc;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::{Page, ScreenshotParams};
use futures::StreamExt;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use field_locator::{ElementHandle, HeuristicRule, LocatorError, PageProbe, TargetDescriptor};
use session_flow::{SubstrateControl, SubstrateError, SubstrateHandle, SubstrateLauncher};
use step_runner::ports::{DriverError, DriverPort};

/// Masks the most common automation tells before sign-in pages load.
const MASK_AUTOMATION_JS: &str = r#"
Object.defineProperty(navigator, 'webdriver', { get: () => undefined });
Object.defineProperty(navigator, 'languages', { get: () => ['en-US', 'en'] });
"#;

/// Launches one fresh browser context per session.
pub struct ChromiumLauncher {
    headless: bool,
    window: (u32, u32),
}

impl ChromiumLauncher {
    pub fn new(headless: bool, window: (u32, u32)) -> Self {
        Self { headless, window }
    }
}

#[async_trait]
impl SubstrateLauncher for ChromiumLauncher {
    async fn launch(&self) -> Result<SubstrateHandle, SubstrateError> {
        let mut builder = BrowserConfig::builder()
            .window_size(self.window.0, self.window.1)
            .args(vec![
                "--no-sandbox",
                "--disable-dev-shm-usage",
                "--disable-gpu",
                "--disable-blink-features=AutomationControlled",
            ]);
        if !self.headless {
            builder = builder.with_head();
        }
        let config = builder
            .build()
            .map_err(SubstrateError::Launch)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|err| SubstrateError::Launch(err.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|err| SubstrateError::Launch(err.to_string()))?;

        if let Err(err) = page.evaluate(MASK_AUTOMATION_JS).await {
            debug!(error = %err, "automation mask script failed");
        }

        info!(headless = self.headless, "browser context acquired");
        let substrate = Arc::new(ChromiumSubstrate {
            browser: Mutex::new(Some(browser)),
            page,
            _handler_task: handler_task,
        });
        Ok(SubstrateHandle::from_parts(
            Arc::clone(&substrate) as Arc<dyn PageProbe>,
            Arc::clone(&substrate) as Arc<dyn DriverPort>,
            substrate as Arc<dyn SubstrateControl>,
        ))
    }
}

pub struct ChromiumSubstrate {
    browser: Mutex<Option<Browser>>,
    page: Page,
    _handler_task: tokio::task::JoinHandle<()>,
}

#[derive(Deserialize)]
struct ProbedNode {
    node_ref: String,
    visible: bool,
    enabled: bool,
    area: f64,
}

#[async_trait]
impl PageProbe for ChromiumSubstrate {
    async fn query(
        &self,
        descriptor: &TargetDescriptor,
    ) -> Result<Vec<ElementHandle>, LocatorError> {
        let script = probe_script(descriptor);
        let result = self
            .page
            .evaluate(script)
            .await
            .map_err(|err| LocatorError::Probe(err.to_string()))?;
        let nodes: Vec<ProbedNode> = result
            .into_value()
            .map_err(|err| LocatorError::Probe(err.to_string()))?;
        Ok(nodes
            .into_iter()
            .map(|node| ElementHandle {
                node_ref: node.node_ref,
                visible: node.visible,
                enabled: node.enabled,
                area: node.area,
            })
            .collect())
    }
}

#[async_trait]
impl DriverPort for ChromiumSubstrate {
    async fn clear(&self, target: &ElementHandle) -> Result<(), DriverError> {
        let script = format!(
            r#"(() => {{
                const el = document.querySelector('[data-mw-id="{id}"]');
                if (!el) return false;
                if ('value' in el) el.value = '';
                else el.innerHTML = '';
                return true;
            }})()"#,
            id = target.node_ref
        );
        let cleared: bool = self
            .page
            .evaluate(script)
            .await
            .map_err(classify_driver)?
            .into_value()
            .map_err(|err| DriverError::Substrate(err.to_string()))?;
        if cleared {
            Ok(())
        } else {
            Err(DriverError::Gone(target.node_ref.clone()))
        }
    }

    async fn type_text(&self, target: &ElementHandle, text: &str) -> Result<(), DriverError> {
        let element = self
            .page
            .find_element(node_selector(target))
            .await
            .map_err(|_| DriverError::Gone(target.node_ref.clone()))?;
        element.click().await.map_err(classify_driver)?;
        element.type_str(text).await.map_err(classify_driver)?;
        Ok(())
    }

    async fn click(&self, target: &ElementHandle) -> Result<(), DriverError> {
        let element = self
            .page
            .find_element(node_selector(target))
            .await
            .map_err(|_| DriverError::Gone(target.node_ref.clone()))?;
        element.click().await.map_err(classify_driver)?;
        Ok(())
    }
}

#[async_trait]
impl SubstrateControl for ChromiumSubstrate {
    async fn navigate(&self, url: &str) -> Result<(), SubstrateError> {
        self.page
            .goto(url)
            .await
            .map_err(|err| SubstrateError::Navigation(err.to_string()))?;
        Ok(())
    }

    async fn screenshot(&self) -> Result<Vec<u8>, SubstrateError> {
        self.page
            .screenshot(
                ScreenshotParams::builder()
                    .format(CaptureScreenshotFormat::Png)
                    .build(),
            )
            .await
            .map_err(|err| SubstrateError::Capture(err.to_string()))
    }

    async fn close(&self) -> Result<(), SubstrateError> {
        let mut guard = self.browser.lock().await;
        if let Some(mut browser) = guard.take() {
            browser
                .close()
                .await
                .map_err(|err| SubstrateError::Close(err.to_string()))?;
            if let Err(err) = browser.wait().await {
                warn!(error = %err, "browser did not exit cleanly");
            }
        }
        Ok(())
    }
}

fn node_selector(target: &ElementHandle) -> String {
    format!("[data-mw-id=\"{}\"]", target.node_ref)
}

fn classify_driver(err: chromiumoxide::error::CdpError) -> DriverError {
    let message = err.to_string();
    if message.to_lowercase().contains("timeout") {
        DriverError::Timeout(message)
    } else {
        DriverError::Substrate(message)
    }
}

/// Build the probe script for one descriptor.
fn probe_script(descriptor: &TargetDescriptor) -> String {
    let collect = match descriptor {
        TargetDescriptor::Attribute { selector } => {
            format!(
                "try {{ els = Array.from(document.querySelectorAll({sel})); }} catch (e) {{ els = []; }}",
                sel = js_string(selector)
            )
        }
        TargetDescriptor::Structural { role, label } => {
            let role_selector = match role.as_str() {
                "button" => "button, [role='button']".to_string(),
                "textbox" => {
                    "input, textarea, [role='textbox'], [contenteditable='true']".to_string()
                }
                other => format!("[role='{other}']"),
            };
            let label_filter = match label {
                Some(label) => format!(
                    "els = els.filter((el) => ((el.getAttribute('aria-label') || '') + ' ' + (el.getAttribute('data-tooltip') || '')).toLowerCase().includes({needle}));",
                    needle = js_string(&label.to_lowercase())
                ),
                None => String::new(),
            };
            format!(
                "els = Array.from(document.querySelectorAll({sel})); {label_filter}",
                sel = js_string(&role_selector)
            )
        }
        TargetDescriptor::Text { contains } => {
            format!(
                "els = Array.from(document.querySelectorAll(\"button, a, [role='button'], div, span\"))\
                 .filter((el) => el.children.length < 3 && (el.textContent || '').trim().toLowerCase().includes({needle}));",
                needle = js_string(&contains.to_lowercase())
            )
        }
        TargetDescriptor::Heuristic(HeuristicRule::LargestEditable) => {
            "els = Array.from(document.querySelectorAll(\"div[contenteditable='true'], textarea, [role='textbox']\"));"
                .to_string()
        }
        TargetDescriptor::Heuristic(HeuristicRule::LabelledEditable { keywords }) => {
            let needles = serde_json::to_string(
                &keywords.iter().map(|k| k.to_lowercase()).collect::<Vec<_>>(),
            )
            .expect("keyword list serializes");
            format!(
                "els = Array.from(document.querySelectorAll(\"input, textarea, div[contenteditable='true']\"))\
                 .filter((el) => {{ const hay = ((el.getAttribute('placeholder') || '') + ' ' + (el.getAttribute('aria-label') || '') + ' ' + (el.getAttribute('name') || '')).toLowerCase(); return {needles}.some((k) => hay.includes(k)); }});",
            )
        }
    };

    format!(
        r#"(() => {{
            let els = [];
            {collect}
            return els.map((el) => {{
                let id = el.getAttribute('data-mw-id');
                if (!id) {{
                    id = 'mw-' + Math.random().toString(36).slice(2);
                    el.setAttribute('data-mw-id', id);
                }}
                const rect = el.getBoundingClientRect();
                const style = window.getComputedStyle(el);
                const visible = rect.width > 0 && rect.height > 0 &&
                    style.visibility !== 'hidden' && style.display !== 'none';
                const enabled = !el.disabled && el.getAttribute('aria-disabled') !== 'true';
                return {{ node_ref: id, visible, enabled, area: rect.width * rect.height }};
            }});
        }})()"#
    )
}

/// Embed a Rust string as a JS string literal.
fn js_string(value: &str) -> String {
    serde_json::to_string(value).expect("string serializes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_script_embeds_the_selector() {
        let script = probe_script(&TargetDescriptor::attribute("input[name='to']"));
        assert!(script.contains("input[name='to']"));
        assert!(script.contains("data-mw-id"));
    }

    #[test]
    fn structural_button_covers_real_buttons() {
        let script = probe_script(&TargetDescriptor::structural("button", Some("Send")));
        assert!(script.contains("button, [role='button']"));
        assert!(script.contains("\"send\""));
    }

    #[test]
    fn heuristic_keywords_are_lowercased() {
        let script = probe_script(&TargetDescriptor::Heuristic(
            HeuristicRule::LabelledEditable {
                keywords: vec!["To".to_string(), "Recipient".to_string()],
            },
        ));
        assert!(script.contains("\"to\""));
        assert!(script.contains("\"recipient\""));
    }

    #[test]
    fn selectors_with_quotes_are_escaped() {
        let script = probe_script(&TargetDescriptor::attribute("div[aria-label*=\"My 'To'\"]"));
        assert!(script.contains("\\\""));
    }
}
