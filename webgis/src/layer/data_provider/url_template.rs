use crate::error::WebGisError;
use crate::tile_schema::TileIndex;

/// XYZ tile url template with `{z}`, `{x}` and `{y}` placeholders and an optional `{a-c}`
/// style subdomain range.
///
/// With a subdomain range, tiles are spread over the subdomains by their index so that the
/// same tile always goes to the same host.
///
/// ```
/// use webgis::layer::data_provider::UrlTemplate;
/// use webgis::tile_schema::TileIndex;
///
/// let template = UrlTemplate::parse("https://{a-c}.example.com/{z}/{x}/{y}.png").unwrap();
/// assert_eq!(template.url(&TileIndex::new(1, 0, 3)), "https://b.example.com/3/1/0.png");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlTemplate {
    template: String,
    subdomains: Vec<char>,
}

impl UrlTemplate {
    /// Parses the template.
    pub fn parse(template: &str) -> Result<Self, WebGisError> {
        for placeholder in ["{z}", "{x}", "{y}"] {
            if !template.contains(placeholder) {
                return Err(WebGisError::Config(format!(
                    "tile url template {template} has no {placeholder} placeholder"
                )));
            }
        }

        let mut subdomains = vec![];
        let mut rest = template;
        while let Some(start) = rest.find('{') {
            let Some(end) = rest[start..].find('}') else {
                break;
            };
            let group: Vec<char> = rest[start + 1..start + end].chars().collect();
            if let [from, '-', to] = group[..] {
                if from > to {
                    return Err(WebGisError::Config(format!(
                        "invalid subdomain range in {template}"
                    )));
                }
                subdomains = (from..=to).collect();
                break;
            }
            rest = &rest[start + end..];
        }

        Ok(Self {
            template: template.to_string(),
            subdomains,
        })
    }

    /// Url of the tile.
    pub fn url(&self, index: &TileIndex) -> String {
        let mut url = self
            .template
            .replace("{z}", &index.z.to_string())
            .replace("{x}", &index.x.to_string())
            .replace("{y}", &index.y.to_string());

        if let (Some(first), Some(last)) = (self.subdomains.first(), self.subdomains.last()) {
            let slot = (index.x + index.y).unsigned_abs() as usize % self.subdomains.len();
            let range = format!("{{{first}-{last}}}");
            url = url.replace(&range, &self.subdomains[slot].to_string());
        }

        url
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn osm_template() {
        let template = UrlTemplate::parse("https://tile.openstreetmap.org/{z}/{x}/{y}.png").unwrap();
        assert_eq!(
            template.url(&TileIndex::new(20, 12, 5)),
            "https://tile.openstreetmap.org/5/20/12.png"
        );
    }

    #[test]
    fn subdomains_rotate() {
        let template =
            UrlTemplate::parse("https://{a-c}.basemaps.cartocdn.com/light_all/{z}/{x}/{y}.png")
                .unwrap();
        assert_eq!(
            template.url(&TileIndex::new(0, 0, 1)),
            "https://a.basemaps.cartocdn.com/light_all/1/0/0.png"
        );
        assert_eq!(
            template.url(&TileIndex::new(1, 0, 1)),
            "https://b.basemaps.cartocdn.com/light_all/1/1/0.png"
        );
        assert_eq!(
            template.url(&TileIndex::new(1, 1, 1)),
            "https://c.basemaps.cartocdn.com/light_all/1/1/1.png"
        );
        assert_eq!(
            template.url(&TileIndex::new(2, 1, 2)),
            "https://a.basemaps.cartocdn.com/light_all/2/2/1.png"
        );
    }

    #[test]
    fn missing_placeholder() {
        assert_matches!(
            UrlTemplate::parse("https://example.com/{z}/{x}.png"),
            Err(WebGisError::Config(_))
        );
    }
}
