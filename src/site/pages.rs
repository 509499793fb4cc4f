use std::collections::BTreeMap;
use std::fmt::Write;

use super::html::{escape, layout, safe_href, PageMeta};
use super::widgets::{text_with_display, EditableWidget};
use crate::content::{self, blocks, keys};
use crate::database::Project;

type Settings = BTreeMap<String, String>;

fn get<'a>(settings: &'a Settings, key: &str) -> &'a str {
    settings.get(key).map(String::as_str).unwrap_or_default()
}

fn text(settings: &Settings, key: &'static str, multiline: bool, is_owner: bool) -> String {
    EditableWidget::Text { key, multiline }.render(settings, is_owner)
}

fn page(settings: &Settings, is_owner: bool, body: &str) -> String {
    let meta = PageMeta {
        title: get(settings, keys::SEO_TITLE),
        description: get(settings, keys::SEO_DESCRIPTION),
        is_owner,
    };
    layout(&meta, &nav(settings, is_owner), body, &footer(settings, is_owner))
}

fn nav(settings: &Settings, is_owner: bool) -> String {
    let avatar = EditableWidget::Image {
        key: keys::NAVBAR_AVATAR_URL,
        upload: true,
    }
    .render(settings, is_owner);

    let mut html = format!(
        "<nav>\n<a class=\"avatar\" href=\"/\">{}</a>\n\
         <a href=\"/\">Home</a> <a href=\"/projects\">Projects</a> <a href=\"/contact\">Contact</a>\n",
        avatar
    );
    if is_owner {
        html.push_str("<button type=\"button\" id=\"owner-logout\">Log out</button>\n");
    }
    html.push_str("</nav>\n");
    html
}

fn footer(settings: &Settings, is_owner: bool) -> String {
    let raw = get(settings, keys::FOOTER_TEXT);
    let copy = text_with_display(keys::FOOTER_TEXT, false, raw, &content::footer_text(raw), is_owner);

    let mut links = String::new();
    for link in blocks::footer_links(get(settings, keys::FOOTER_LINKS_JSON)) {
        let _ = write!(links, "<a href=\"{}\">{}</a> ", safe_href(&link.href), escape(&link.label));
    }
    let editor = EditableWidget::Json {
        key: keys::FOOTER_LINKS_JSON,
    }
    .render(settings, is_owner);

    format!("<footer>\n<p>{}</p>\n<p>{}{}</p>\n</footer>\n", copy, links, editor)
}

fn hero(settings: &Settings, is_owner: bool) -> String {
    let cta1 = EditableWidget::Link {
        label_key: keys::HERO_CTA1_LABEL,
        href_key: keys::HERO_CTA1_HREF,
    };
    let cta2 = EditableWidget::Link {
        label_key: keys::HERO_CTA2_LABEL,
        href_key: keys::HERO_CTA2_HREF,
    };
    format!(
        "<section id=\"hero\">\n<h1>{}</h1>\n<p>{}</p>\n<p>{} {}</p>\n</section>\n",
        text(settings, keys::HERO_HEADLINE, false, is_owner),
        text(settings, keys::HERO_SUBHEADLINE, true, is_owner),
        cta1.render(settings, is_owner),
        cta2.render(settings, is_owner),
    )
}

fn about(settings: &Settings, is_owner: bool) -> String {
    format!(
        "<section id=\"about\">\n<h2>{}</h2>\n<p>{}</p>\n</section>\n",
        text(settings, keys::ABOUT_TITLE, false, is_owner),
        text(settings, keys::ABOUT_BODY, true, is_owner),
    )
}

fn capabilities(settings: &Settings, is_owner: bool) -> String {
    let mut cards = String::new();
    for card in blocks::capabilities(get(settings, keys::CAPABILITIES_JSON)) {
        let _ = writeln!(
            cards,
            "<li><h3>{}</h3><p>{}</p></li>",
            escape(&card.title),
            escape(&card.description)
        );
    }
    format!(
        "<section id=\"capabilities\">\n<h2>{}</h2>\n<p>{}</p>\n<ul class=\"cards\">\n{}</ul>\n{}\n</section>\n",
        text(settings, keys::CAPABILITIES_TITLE, false, is_owner),
        text(settings, keys::CAPABILITIES_SUBTITLE, false, is_owner),
        cards,
        EditableWidget::Json {
            key: keys::CAPABILITIES_JSON
        }
        .render(settings, is_owner),
    )
}

fn experience(settings: &Settings, is_owner: bool) -> String {
    let mut entries = String::new();
    for entry in blocks::experience(get(settings, keys::EXPERIENCE_JSON)) {
        let _ = writeln!(
            entries,
            "<li><h3>{} <small>{}</small></h3><p class=\"period\">{}</p><p>{}</p></li>",
            escape(&entry.role),
            escape(&entry.company),
            escape(&entry.period),
            escape(&entry.description)
        );
    }
    format!(
        "<section id=\"experience\">\n<h2>{}</h2>\n<p>{}</p>\n<ol class=\"timeline\">\n{}</ol>\n{}\n</section>\n",
        text(settings, keys::EXPERIENCE_TITLE, false, is_owner),
        text(settings, keys::EXPERIENCE_SUBTITLE, false, is_owner),
        entries,
        EditableWidget::Json {
            key: keys::EXPERIENCE_JSON
        }
        .render(settings, is_owner),
    )
}

fn contact(settings: &Settings, is_owner: bool) -> String {
    let mut links = String::new();
    let email = get(settings, keys::CONTACT_EMAIL);
    if !email.is_empty() {
        let _ = write!(links, "<a href=\"mailto:{}\">{}</a> ", escape(email), escape(email));
    }
    for (key, label) in [
        (keys::GITHUB_URL, "GitHub"),
        (keys::LINKEDIN_URL, "LinkedIn"),
        (keys::X_URL, "X"),
    ] {
        let url = get(settings, key);
        if !url.is_empty() {
            let _ = write!(links, "<a href=\"{}\">{}</a> ", safe_href(url), label);
        }
    }

    let mut owner_fields = String::new();
    if is_owner {
        for (key, label) in [
            (keys::CONTACT_EMAIL, "Email"),
            (keys::GITHUB_URL, "GitHub URL"),
            (keys::LINKEDIN_URL, "LinkedIn URL"),
            (keys::X_URL, "X URL"),
        ] {
            let _ = writeln!(owner_fields, "<p>{}: {}</p>", label, text(settings, key, false, true));
        }
    }

    format!(
        "<section id=\"contact\">\n<h2>{}</h2>\n<p>{}</p>\n<p class=\"links\">{}</p>\n{}</section>\n",
        text(settings, keys::CONTACT_TITLE, false, is_owner),
        text(settings, keys::CONTACT_SUBTITLE, true, is_owner),
        links,
        owner_fields,
    )
}

fn project_card(project: &Project, is_owner: bool) -> String {
    let mut html = String::new();
    let _ = write!(html, "<article class=\"project\" id=\"{}\"", escape(&project.slug));
    if is_owner {
        let _ = write!(
            html,
            " data-project-id=\"{}\" data-project=\"{}\"",
            project.id,
            escape(&serde_json::to_string(project).unwrap_or_default())
        );
    }
    html.push_str(">\n");

    if !project.image_url.is_empty() {
        let _ = writeln!(
            html,
            "<img src=\"{}\" alt=\"{}\">",
            safe_href(&project.image_url),
            escape(&project.title)
        );
    }
    let _ = writeln!(html, "<h3>{}</h3>", escape(&project.title));
    if !project.description.is_empty() {
        let _ = writeln!(html, "<p>{}</p>", escape(&project.description));
    }
    if !project.tech_stack.is_empty() {
        html.push_str("<ul class=\"tags\">");
        for tech in &project.tech_stack {
            let _ = write!(html, "<li>{}</li>", escape(tech));
        }
        html.push_str("</ul>\n");
    }
    if !project.url.is_empty() {
        let _ = writeln!(html, "<a href=\"{}\">Visit</a>", safe_href(&project.url));
    }
    if is_owner {
        html.push_str(
            "<button type=\"button\" class=\"project-edit\">Edit</button> \
             <button type=\"button\" class=\"project-delete\">Delete</button>\n",
        );
    }
    html.push_str("</article>\n");
    html
}

fn project_grid(projects: &[Project], is_owner: bool) -> String {
    let mut html = String::from("<div class=\"projects\">\n");
    if is_owner {
        html.push_str("<button type=\"button\" id=\"project-new\">New project</button>\n");
    }
    for project in projects {
        html.push_str(&project_card(project, is_owner));
    }
    html.push_str("</div>\n");
    html
}

/// `/`: hero, about, capabilities, experience, featured projects, contact.
pub fn home(settings: &Settings, featured: &[Project], is_owner: bool) -> String {
    let mut body = String::new();
    body.push_str(&hero(settings, is_owner));
    body.push_str(&about(settings, is_owner));
    body.push_str(&capabilities(settings, is_owner));
    body.push_str(&experience(settings, is_owner));
    body.push_str("<section id=\"featured\">\n<h2>Featured Projects</h2>\n");
    body.push_str(&project_grid(featured, is_owner));
    body.push_str("</section>\n");
    body.push_str(&contact(settings, is_owner));
    page(settings, is_owner, &body)
}

/// `/projects`: every project in listing order.
pub fn projects(settings: &Settings, projects: &[Project], is_owner: bool) -> String {
    let mut body = String::from("<section id=\"projects\">\n<h1>Projects</h1>\n");
    body.push_str(&project_grid(projects, is_owner));
    body.push_str("</section>\n");
    page(settings, is_owner, &body)
}

/// `/contact`
pub fn contact_page(settings: &Settings, is_owner: bool) -> String {
    page(settings, is_owner, &contact(settings, is_owner))
}
