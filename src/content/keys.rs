//! Every content key the site renders, with the copy used until the owner edits it.

pub const HERO_HEADLINE: &str = "hero_headline";
pub const HERO_SUBHEADLINE: &str = "hero_subheadline";
pub const HERO_CTA1_LABEL: &str = "hero_cta1_label";
pub const HERO_CTA1_HREF: &str = "hero_cta1_href";
pub const HERO_CTA2_LABEL: &str = "hero_cta2_label";
pub const HERO_CTA2_HREF: &str = "hero_cta2_href";
pub const ABOUT_TITLE: &str = "about_title";
pub const ABOUT_BODY: &str = "about_body";
pub const CAPABILITIES_TITLE: &str = "capabilities_title";
pub const CAPABILITIES_SUBTITLE: &str = "capabilities_subtitle";
pub const CAPABILITIES_JSON: &str = "capabilities_json";
pub const CONTACT_TITLE: &str = "contact_title";
pub const CONTACT_SUBTITLE: &str = "contact_subtitle";
pub const CONTACT_EMAIL: &str = "contact_email";
pub const GITHUB_URL: &str = "github_url";
pub const LINKEDIN_URL: &str = "linkedin_url";
pub const X_URL: &str = "x_url";
pub const NAVBAR_AVATAR_URL: &str = "navbar_avatar_url";
pub const EXPERIENCE_TITLE: &str = "experience_title";
pub const EXPERIENCE_SUBTITLE: &str = "experience_subtitle";
pub const EXPERIENCE_JSON: &str = "experience_json";
pub const FOOTER_TEXT: &str = "footer_text";
pub const FOOTER_LINKS_JSON: &str = "footer_links_json";
pub const SEO_TITLE: &str = "seo_title";
pub const SEO_DESCRIPTION: &str = "seo_description";

const DEFAULT_CAPABILITIES: &str = r#"[
  {
    "title": "Frontend Architecture",
    "description": "Design systems, performance, DX"
  },
  {
    "title": "Backend Systems",
    "description": "APIs, microservices, data pipelines"
  },
  {
    "title": "DevOps & Infrastructure",
    "description": "CI/CD, observability, cloud"
  },
  {
    "title": "System Design",
    "description": "Scalability, reliability, tradeoffs"
  }
]"#;

const DEFAULT_EXPERIENCE: &str = r#"[
  {
    "company": "Company Name",
    "role": "Senior Developer",
    "period": "2022 - Present",
    "description": "Placeholder for experience description"
  },
  {
    "company": "Previous Company",
    "role": "Full Stack Developer",
    "period": "2020 - 2022",
    "description": "Placeholder for experience description"
  }
]"#;

const DEFAULT_FOOTER_LINKS: &str = r#"[
  {
    "label": "GitHub",
    "href": "https://github.com"
  },
  {
    "label": "LinkedIn",
    "href": "https://linkedin.com"
  },
  {
    "label": "X",
    "href": "https://x.com"
  }
]"#;

pub const DEFAULT_SETTINGS: &[(&str, &str)] = &[
    // Hero
    (HERO_HEADLINE, "I design AI-powered, data-intensive systems that scale."),
    (
        HERO_SUBHEADLINE,
        "Senior engineer focused on distributed systems, AI integration, and platform architecture. \
         I build resilient backends, optimized data pipelines, and interfaces that enable actionable intelligence.",
    ),
    (HERO_CTA1_LABEL, "View Projects"),
    (HERO_CTA1_HREF, "/projects"),
    (HERO_CTA2_LABEL, "System Capabilities"),
    (HERO_CTA2_HREF, "#capabilities"),
    // About
    (ABOUT_TITLE, "About"),
    (
        ABOUT_BODY,
        "I specialize in building reliable, scalable platforms and bringing AI into production. \
         This portfolio showcases selected work and areas of focus.",
    ),
    // Capabilities
    (CAPABILITIES_TITLE, "System Capabilities"),
    (CAPABILITIES_SUBTITLE, "Technical expertise and capabilities"),
    (CAPABILITIES_JSON, DEFAULT_CAPABILITIES),
    // Contact
    (CONTACT_TITLE, "Get in Touch"),
    (CONTACT_SUBTITLE, "Interested in working together? Let's connect."),
    (CONTACT_EMAIL, ""),
    (GITHUB_URL, ""),
    (LINKEDIN_URL, ""),
    (X_URL, ""),
    // Navbar
    (NAVBAR_AVATAR_URL, ""),
    // Experience
    (EXPERIENCE_TITLE, "Experience"),
    (EXPERIENCE_SUBTITLE, "Professional journey and career highlights"),
    (EXPERIENCE_JSON, DEFAULT_EXPERIENCE),
    // Footer
    (FOOTER_TEXT, "© {year} Portfolio. All rights reserved."),
    (FOOTER_LINKS_JSON, DEFAULT_FOOTER_LINKS),
    // SEO
    (SEO_TITLE, "Senior Engineer Portfolio"),
    (SEO_DESCRIPTION, "AI-powered systems, distributed platforms, and resilient backends."),
];
