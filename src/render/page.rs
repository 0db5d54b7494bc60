//! Dashboard page: one HTML document with a tab per chart.

use super::svg::escape_xml;
use super::ChartArtifact;

const PAGE_STYLE: &str = r#"
body { font-family: Helvetica, Arial, sans-serif; margin: 24px; color: #222; }
.tabs { display: flex; flex-wrap: wrap; gap: 4px; border-bottom: 1px solid #ccc; }
.tabs button { border: 1px solid #ccc; border-bottom: none; background: #f5f5f5; padding: 8px 12px; cursor: pointer; }
.tabs button.active { background: #fff; font-weight: bold; }
.panel { display: none; padding-top: 16px; }
.panel.active { display: block; }
"#;

const PAGE_SCRIPT: &str = r#"
function showTab(slug) {
  document.querySelectorAll('.panel').forEach(p => p.classList.toggle('active', p.id === 'panel-' + slug));
  document.querySelectorAll('.tabs button').forEach(b => b.classList.toggle('active', b.dataset.slug === slug));
}
"#;

/// Full dashboard page; the first tab starts active
pub fn dashboard_page(title: &str, subtitle: &str, artifacts: &[ChartArtifact]) -> String {
    let tabs: String = artifacts
        .iter()
        .enumerate()
        .map(|(i, a)| {
            format!(
                r#"<button type="button" data-slug="{slug}" class="{class}" onclick="showTab('{slug}')">{label}</button>"#,
                slug = a.view.slug(),
                class = if i == 0 { "active" } else { "" },
                label = escape_xml(a.view.tab_label()),
            )
        })
        .collect();

    let panels: String = artifacts
        .iter()
        .enumerate()
        .map(|(i, a)| {
            let element = a.page_element();
            if i == 0 {
                element.replacen(r#"class="panel""#, r#"class="panel active""#, 1)
            } else {
                element
            }
        })
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>{title}</title>
    <style>{style}</style>
</head>
<body>
    <h1>{title}</h1>
    <p>{subtitle}</p>
    <nav class="tabs">{tabs}</nav>
    {panels}
    <script>{script}</script>
</body>
</html>"#,
        title = escape_xml(title),
        subtitle = escape_xml(subtitle),
        style = PAGE_STYLE,
        tabs = tabs,
        panels = panels,
        script = PAGE_SCRIPT,
    )
}
