//! Converts article bodies from markdown to HTML. Each body is rendered twice:
//! once for the article page, where site-relative links work as written, and
//! once for the Atom feed, where root-relative links and image sources are
//! rewritten against the site URL so they still resolve in a feed reader.

use pulldown_cmark::{html, CowStr, Event, LinkType, Options, Parser, Tag};
use url::{ParseError as UrlParseError, Url};

/// The renditions of a single markdown body.
#[derive(Debug, Default, PartialEq)]
pub struct Rendered {
    /// HTML with links as written.
    pub body: String,

    /// HTML with root-relative links made absolute.
    pub feed_body: String,

    /// The plain text of the first paragraph.
    pub excerpt: String,
}

fn options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_SMART_PUNCTUATION);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);
    options
}

/// Renders `markdown` into a [`Rendered`]. `site_url` is the absolute URL that
/// root-relative links are resolved against in the feed rendition.
pub fn render(markdown: &str, site_url: &Url) -> Result<Rendered, UrlParseError> {
    let mut rendered = Rendered::default();
    html::push_html(&mut rendered.body, Parser::new_ext(markdown, options()));

    let converter = LinkConverter { site_url };
    let events = Parser::new_ext(markdown, options())
        .map(|ev| converter.convert(ev))
        .collect::<Result<Vec<Event>, UrlParseError>>()?;
    html::push_html(&mut rendered.feed_body, events.into_iter());

    rendered.excerpt = excerpt(markdown);
    Ok(rendered)
}

/// Collects the text of the first paragraph, dropping any markup.
fn excerpt(markdown: &str) -> String {
    let mut text = String::new();
    let mut in_paragraph = false;
    for ev in Parser::new_ext(markdown, options()) {
        match ev {
            Event::Start(Tag::Paragraph) => in_paragraph = true,
            Event::End(Tag::Paragraph) => break,
            Event::Text(s) | Event::Code(s) if in_paragraph => text.push_str(&s),
            Event::SoftBreak | Event::HardBreak if in_paragraph => text.push(' '),
            _ => {}
        }
    }
    text
}

struct LinkConverter<'a> {
    site_url: &'a Url,
}

impl<'a> LinkConverter<'a> {
    /// Root-relative destinations (`/foo`, but not protocol-relative `//foo`)
    /// are joined onto the site URL; everything else passes through.
    fn convert_dest<'b>(&self, dest: CowStr<'b>) -> Result<CowStr<'b>, UrlParseError> {
        if dest.starts_with('/') && !dest.starts_with("//") {
            let absolute = self.site_url.join(&dest)?;
            return Ok(CowStr::Boxed(String::from(absolute).into_boxed_str()));
        }
        Ok(dest)
    }

    fn convert_tag<'b>(&self, tag: Tag<'b>) -> Result<Tag<'b>, UrlParseError> {
        Ok(match tag {
            email @ Tag::Link(LinkType::Email, _, _) => email,
            Tag::Link(link, dest, title) => Tag::Link(link, self.convert_dest(dest)?, title),
            Tag::Image(link, dest, title) => Tag::Image(link, self.convert_dest(dest)?, title),
            _ => tag,
        })
    }

    fn convert<'b>(&self, ev: Event<'b>) -> Result<Event<'b>, UrlParseError> {
        Ok(match ev {
            Event::Start(tag) => Event::Start(self.convert_tag(tag)?),
            _ => ev,
        })
    }
}
