use handlebars::Handlebars;
use rust_embed::RustEmbed;
use serde::Serialize;

use crate::server::error::ServerError;

/// Page templates and static files, baked into the binary.
#[derive(RustEmbed)]
#[folder = "assets/"]
pub struct Assets;

pub const INDEX: &str = "index";
pub const VIEW: &str = "view";

const PAGES: [(&str, &str); 2] = [
    (INDEX, "templates/index.hbs"),
    (VIEW, "templates/view.hbs"),
];

/// Handlebars registry for the HTML pages. Output is HTML-escaped.
pub struct Templates {
    registry: Handlebars<'static>,
}

impl Templates {
    pub fn load() -> Result<Self, ServerError> {
        let mut registry = Handlebars::new();
        for (name, path) in PAGES {
            let file = Assets::get(path).ok_or(ServerError::MissingTemplate(name))?;
            let source =
                std::str::from_utf8(&file.data).map_err(|_| ServerError::TemplateEncoding(name))?;
            registry.register_template_string(name, source)?;
        }
        Ok(Self { registry })
    }

    pub fn render<T: Serialize>(&self, name: &str, data: &T) -> Result<String, ServerError> {
        Ok(self.registry.render(name, data)?)
    }
}
