//! In-memory `PageDriver` for harvest and extraction tests.

use anyhow::{anyhow, Result};
use std::cell::RefCell;
use std::collections::HashMap;

use crate::session::PageDriver;

#[derive(Default)]
pub struct FakeDriver {
    /// url -> successive pages reachable through the next-page control.
    sites: HashMap<String, Vec<String>>,
    /// Keep reporting a next control after the last page.
    endless: bool,
    /// 1-based page on which `content` / `activate` report a browser failure.
    content_fails_on: Option<usize>,
    click_fails_on: Option<usize>,
    current: RefCell<Option<(String, usize)>>,
    pub opened: RefCell<Vec<String>>,
    pub clicks: RefCell<usize>,
}

impl FakeDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, html: &str) -> Self {
        self.sites.insert(url.to_string(), vec![html.to_string()]);
        self
    }

    pub fn pages<S: AsRef<str>>(mut self, url: &str, pages: &[S]) -> Self {
        self.sites
            .insert(url.to_string(), pages.iter().map(|p| p.as_ref().to_string()).collect());
        self
    }

    pub fn endless(mut self) -> Self {
        self.endless = true;
        self
    }

    pub fn content_fails_on(mut self, page: usize) -> Self {
        self.content_fails_on = Some(page);
        self
    }

    pub fn click_fails_on(mut self, page: usize) -> Self {
        self.click_fails_on = Some(page);
        self
    }
}

impl PageDriver for FakeDriver {
    fn open(&self, url: &str) -> Result<String> {
        self.opened.borrow_mut().push(url.to_string());
        let pages = self
            .sites
            .get(url)
            .ok_or_else(|| anyhow!("net::ERR_NAME_NOT_RESOLVED {}", url))?;
        *self.current.borrow_mut() = Some((url.to_string(), 0));
        Ok(pages[0].clone())
    }

    fn content(&self) -> Result<String> {
        let current = self.current.borrow();
        let (url, idx) = current.as_ref().ok_or_else(|| anyhow!("no page open"))?;
        if self.content_fails_on == Some(*idx + 1) {
            return Err(anyhow!("target closed while reading page {}", idx + 1));
        }
        let pages = &self.sites[url];
        Ok(pages[(*idx).min(pages.len() - 1)].clone())
    }

    fn activate(&self, _selector: &str) -> Result<bool> {
        let mut current = self.current.borrow_mut();
        let Some((url, idx)) = current.as_mut() else {
            return Ok(false);
        };
        if self.click_fails_on == Some(*idx + 1) {
            return Err(anyhow!("click on page {} failed: connection reset", *idx + 1));
        }
        if *idx + 1 < self.sites[url.as_str()].len() || self.endless {
            *idx += 1;
            *self.clicks.borrow_mut() += 1;
            Ok(true)
        } else {
            Ok(false)
        }
    }
}
