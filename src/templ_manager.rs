use tera::{Context, Tera};
use tracing::info;

use crate::rate_client::RateQuote;

const HEADER_IMG: &str =
    "https://github.com/andrpech/ses-gen-tech/blob/main/assets/img/header.jpg?raw=true";
const FOOTER_IMG: &str =
    "https://github.com/andrpech/ses-gen-tech/blob/main/assets/img/footer.jpg?raw=true";

#[derive(Debug)]
pub struct TemplateManager {
    tera: Tera,
}

impl TemplateManager {
    /// Parses every template under `templates/`, relative to the current working directory.
    pub fn init() -> Result<Self, tera::Error> {
        info!(
            "{:<20} - Initializing the Template manager",
            "templ manager"
        );
        let tera = Tera::new("templates/**/*")?;
        Ok(Self { tera })
    }

    /// Renders the rate notification for `quote` from 'email/rate.html'.
    pub fn render_rate_email(&self, quote: &RateQuote) -> Result<String, tera::Error> {
        let mut ctx = Context::new();
        ctx.insert("symbol", &quote.symbol);
        ctx.insert("price", &format!("{:.2}", quote.price));
        ctx.insert("header_img", HEADER_IMG);
        ctx.insert("footer_img", FOOTER_IMG);

        self.tera.render("email/rate.html", &ctx)
    }
}
