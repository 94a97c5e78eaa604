//! Page updater implementation.

use mdsync_renderer::BlockRenderer;
use tracing::{debug, info};

use crate::api::ContentApi;
use crate::assembler::{FragmentBuilder, RenderedFragment, merge};
use crate::marker::{ContentMarker, MarkerIndex};
use crate::source::SourceUnit;
use crate::types::RemoteDocument;

use super::UpdateConfig;
use super::error::UpdateError;
use super::result::{DryRunResult, UnitReport, UnitStatus, UpdateResult};

/// Inserts Markdown sources into a Confluence page.
pub struct PageUpdater<'a, C: ContentApi> {
    client: &'a C,
    config: UpdateConfig,
}

/// Fragments prepared against one snapshot of the page.
struct Plan {
    document: RemoteDocument,
    fragments: Vec<RenderedFragment>,
    units: Vec<UnitReport>,
}

impl<'a, C: ContentApi> PageUpdater<'a, C> {
    /// Create a new page updater.
    #[must_use]
    pub fn new(client: &'a C, config: UpdateConfig) -> Self {
        Self { client, config }
    }

    /// Insert every new source into the page.
    ///
    /// This method:
    /// 1. Fetches the page once
    /// 2. Skips empty sources and sources whose marker is already present
    /// 3. Renders the rest and merges them into the body
    /// 4. Writes the page once, requesting the next version
    ///
    /// When nothing is new the page is not written and
    /// [`UpdateResult::page`] is `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the page cannot be fetched ([`UpdateError::RemoteFetch`])
    /// - a source fails to render ([`UpdateError::Render`])
    /// - the write is rejected, including version conflicts
    ///   ([`UpdateError::RemoteWrite`])
    pub fn update(
        &self,
        page_id: &str,
        units: &[SourceUnit],
        message: Option<&str>,
    ) -> Result<UpdateResult, UpdateError> {
        let plan = self.plan(page_id, units)?;
        let url = self.client.page_url(page_id);
        let previous_version = plan.document.version;

        if plan.fragments.is_empty() {
            info!("No new content to add to page {page_id}");
            return Ok(UpdateResult {
                page: None,
                url,
                previous_version,
                units: plan.units,
            });
        }

        let body = merge(&plan.document.body, &plan.fragments, self.config.position);
        let page = self
            .client
            .push_page(&plan.document, &body, message)
            .map_err(UpdateError::RemoteWrite)?;
        info!(
            "Updated page {page_id} to version {} with {} new section(s)",
            page.version.number,
            plan.fragments.len()
        );

        Ok(UpdateResult {
            page: Some(page),
            url,
            previous_version,
            units: plan.units,
        })
    }

    /// Compute the body an update would write, without writing it.
    ///
    /// # Errors
    ///
    /// Returns an error if the page cannot be fetched or a source fails to
    /// render.
    pub fn dry_run(&self, page_id: &str, units: &[SourceUnit]) -> Result<DryRunResult, UpdateError> {
        let plan = self.plan(page_id, units)?;
        let html = merge(&plan.document.body, &plan.fragments, self.config.position);

        Ok(DryRunResult {
            html,
            current_title: plan.document.title,
            current_version: plan.document.version,
            units: plan.units,
            url: self.client.page_url(page_id),
        })
    }

    fn plan(&self, page_id: &str, units: &[SourceUnit]) -> Result<Plan, UpdateError> {
        let document = self
            .client
            .fetch_page(page_id)
            .map_err(UpdateError::RemoteFetch)?;
        debug!(
            "Fetched page {page_id} '{}' at version {}",
            document.title, document.version
        );

        let mut index = MarkerIndex::build(&document.body);
        let renderer = BlockRenderer::new().with_strict_tables(self.config.strict_tables);
        let builder = FragmentBuilder::new(self.config.heading_level, self.config.separator);

        let mut fragments = Vec::new();
        let mut reports = Vec::with_capacity(units.len());

        for unit in units {
            let file_name = unit.file_name();

            if unit.is_empty() {
                info!("{file_name}: empty, skipped");
                reports.push(UnitReport {
                    file_name,
                    marker: None,
                    status: UnitStatus::Empty,
                });
                continue;
            }

            let marker = ContentMarker::identify(
                &unit.content,
                &self.config.anchor_prefix,
                self.config.hash_len,
            );

            if index.contains(&marker) {
                info!("{file_name}: already present ({marker}), skipped");
                reports.push(UnitReport {
                    file_name,
                    marker: Some(marker),
                    status: UnitStatus::AlreadyPresent,
                });
                continue;
            }

            let body = renderer
                .render_document(&unit.content)
                .map_err(|source| UpdateError::Render {
                    file: file_name.clone(),
                    source,
                })?;
            index.insert(&marker);
            fragments.push(builder.build(&unit.name, marker.clone(), &body));

            info!("{file_name}: prepared ({marker})");
            reports.push(UnitReport {
                file_name,
                marker: Some(marker),
                status: UnitStatus::Prepared,
            });
        }

        Ok(Plan {
            document,
            fragments,
            units: reports,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfluenceError;
    use crate::mock::MockContentApi;
    use mdsync_config::InsertPosition;
    use pretty_assertions::assert_eq;

    fn unit(name: &str, content: &str) -> SourceUnit {
        SourceUnit::new(name, format!("{name}.md"), content)
    }

    fn config() -> UpdateConfig {
        UpdateConfig::default()
    }

    #[test]
    fn test_update_appends_sections() {
        let api = MockContentApi::new().with_page("1", "Notes", 4, "<p>existing</p>");
        let updater = PageUpdater::new(&api, config());

        let result = updater
            .update("1", &[unit("a", "# A\n\nalpha"), unit("b", "beta")], Some("sync"))
            .unwrap();

        assert!(result.is_updated());
        assert_eq!(result.prepared_count(), 2);
        assert_eq!(result.previous_version, 4);
        assert_eq!(result.url, "https://wiki.test/pages/viewpage.action?pageId=1");

        let pushes = api.pushes();
        assert_eq!(pushes.len(), 1);
        let push = &pushes[0];
        assert_eq!(push.page_id, "1");
        assert_eq!(push.version, 5);
        assert_eq!(push.message.as_deref(), Some("sync"));
        assert!(push.body.starts_with("<p>existing</p><hr />"));

        let a = ContentMarker::identify("# A\n\nalpha", "mdfile", 12);
        let b = ContentMarker::identify("beta", "mdfile", 12);
        let a_at = push.body.find(&a.to_storage()).unwrap();
        let b_at = push.body.find(&b.to_storage()).unwrap();
        assert!(a_at < b_at);
        assert!(push.body.contains("<h2>a</h2>"));
        assert!(push.body.contains("<p>beta</p>"));
    }

    #[test]
    fn test_second_run_adds_nothing() {
        let api = MockContentApi::new().with_page("1", "Notes", 1, "");
        let updater = PageUpdater::new(&api, config());
        let units = [unit("a", "alpha"), unit("b", "beta")];

        updater.update("1", &units, None).unwrap();
        let second = updater.update("1", &units, None).unwrap();

        assert!(!second.is_updated());
        assert_eq!(second.prepared_count(), 0);
        assert!(
            second
                .units
                .iter()
                .all(|u| u.status == UnitStatus::AlreadyPresent)
        );
        assert_eq!(api.pushes().len(), 1);
        assert_eq!(api.page_version("1"), Some(2));
    }

    #[test]
    fn test_only_new_files_are_added() {
        let api = MockContentApi::new().with_page("1", "Notes", 1, "");
        let updater = PageUpdater::new(&api, config());

        updater.update("1", &[unit("a", "alpha")], None).unwrap();
        let result = updater
            .update("1", &[unit("a", "alpha"), unit("b", "beta")], None)
            .unwrap();

        let statuses: Vec<_> = result.units.iter().map(|u| u.status).collect();
        assert_eq!(statuses, vec![UnitStatus::AlreadyPresent, UnitStatus::Prepared]);
        let body = &api.pushes()[1].body;
        assert_eq!(body.matches(r#"ac:name="anchor""#).count(), 2);
    }

    #[test]
    fn test_empty_units_are_skipped() {
        let api = MockContentApi::new().with_page("1", "Notes", 1, "<p>x</p>");
        let updater = PageUpdater::new(&api, config());

        let result = updater
            .update("1", &[unit("blank", "  \n\n\t")], None)
            .unwrap();

        assert!(!result.is_updated());
        assert_eq!(result.units[0].status, UnitStatus::Empty);
        assert_eq!(result.units[0].marker, None);
        assert!(api.pushes().is_empty());
    }

    #[test]
    fn test_duplicate_content_in_one_run_inserted_once() {
        let api = MockContentApi::new().with_page("1", "Notes", 1, "");
        let updater = PageUpdater::new(&api, config());

        let result = updater
            .update("1", &[unit("a", "same"), unit("b", "same\n")], None)
            .unwrap();

        let statuses: Vec<_> = result.units.iter().map(|u| u.status).collect();
        assert_eq!(statuses, vec![UnitStatus::Prepared, UnitStatus::AlreadyPresent]);
        assert_eq!(api.pushes()[0].body.matches("<h2>").count(), 1);
    }

    #[test]
    fn test_conflict_is_reported_after_single_write() {
        let api = MockContentApi::new()
            .with_page("1", "Notes", 3, "")
            .with_push_error(409, "version conflict");
        let updater = PageUpdater::new(&api, config());

        let err = updater.update("1", &[unit("a", "alpha")], None).unwrap_err();

        match err {
            UpdateError::RemoteWrite(e) => assert!(e.is_conflict()),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(api.pushes().len(), 1);
        assert_eq!(api.pushes()[0].version, 4);
    }

    #[test]
    fn test_missing_page_is_fetch_error() {
        let api = MockContentApi::new();
        let updater = PageUpdater::new(&api, config());

        let err = updater.update("404", &[unit("a", "alpha")], None).unwrap_err();

        assert!(matches!(
            err,
            UpdateError::RemoteFetch(ConfluenceError::NotFound { .. })
        ));
        assert!(api.pushes().is_empty());
    }

    #[test]
    fn test_prepend_and_replace() {
        let prepend = MockContentApi::new().with_page("1", "Notes", 1, "<p>old</p>");
        let updater = PageUpdater::new(
            &prepend,
            UpdateConfig {
                position: InsertPosition::Prepend,
                ..config()
            },
        );
        updater.update("1", &[unit("a", "alpha")], None).unwrap();
        assert!(prepend.pushes()[0].body.ends_with("<p>old</p>"));

        let replace = MockContentApi::new().with_page("1", "Notes", 1, "<p>old</p>");
        let updater = PageUpdater::new(
            &replace,
            UpdateConfig {
                position: InsertPosition::Replace,
                ..config()
            },
        );
        updater.update("1", &[unit("a", "alpha")], None).unwrap();
        assert!(!replace.pushes()[0].body.contains("<p>old</p>"));
        assert!(replace.pushes()[0].body.contains("<p>alpha</p>"));
    }

    #[test]
    fn test_section_options() {
        let api = MockContentApi::new().with_page("1", "Notes", 1, "");
        let updater = PageUpdater::new(
            &api,
            UpdateConfig {
                heading_level: 3,
                separator: false,
                anchor_prefix: "doc".to_owned(),
                hash_len: 8,
                ..config()
            },
        );

        updater.update("1", &[unit("hi", "hello")], None).unwrap();

        let body = &api.pushes()[0].body;
        assert!(body.starts_with(
            r#"<ac:structured-macro ac:name="anchor"><ac:parameter ac:name="name">doc-2cf24dba</ac:parameter>"#
        ));
        assert!(body.contains("<h3>hi</h3>"));
        assert!(!body.contains("<hr />"));
    }

    #[test]
    fn test_tables_rendered_in_panel() {
        let api = MockContentApi::new().with_page("1", "Notes", 1, "");
        let updater = PageUpdater::new(&api, config());

        updater
            .update("1", &[unit("t", "intro\n\n| a | b |\n|---|---|\n| 1 | 2 |\n")], None)
            .unwrap();

        let body = &api.pushes()[0].body;
        assert!(body.contains(r#"ac:name="panel""#));
        assert!(body.contains("<table>"));
    }

    #[test]
    fn test_table_lookalikes_do_not_abort_the_run() {
        let api = MockContentApi::new().with_page("1", "Notes", 1, "");
        let updater = PageUpdater::new(&api, config());
        let units = [
            unit("good", "alpha"),
            unit("uneven", "| a | b | c |\n|---|---|\n| 1 | 2 | 3 |\n"),
            unit("indented", "    | a | b |\n    |---|---|\n    | 1 | 2 |\n"),
        ];

        let result = updater.update("1", &units, None).unwrap();

        assert!(result.units.iter().all(|u| u.status == UnitStatus::Prepared));
        assert_eq!(result.prepared_count(), 3);
        let pushes = api.pushes();
        assert_eq!(pushes.len(), 1);
        assert!(!pushes[0].body.contains("<table>"));
        assert!(pushes[0].body.contains("<p>alpha</p>"));
    }

    #[test]
    fn test_page_without_body_is_treated_as_empty() {
        let api = MockContentApi::new().with_bodyless_page("1", "Notes", 2);
        let updater = PageUpdater::new(&api, config());

        let result = updater.update("1", &[unit("a", "alpha")], None).unwrap();

        assert!(result.is_updated());
        assert!(api.pushes()[0].body.starts_with("<hr />"));
    }

    #[test]
    fn test_dry_run_does_not_write() {
        let api = MockContentApi::new().with_page("1", "Notes", 7, "<p>old</p>");
        let updater = PageUpdater::new(&api, config());

        let preview = updater.dry_run("1", &[unit("a", "alpha")]).unwrap();

        assert!(preview.has_changes());
        assert_eq!(preview.current_version, 7);
        assert_eq!(preview.current_title, "Notes");
        assert!(preview.html.starts_with("<p>old</p><hr />"));
        assert!(api.pushes().is_empty());
    }
}
