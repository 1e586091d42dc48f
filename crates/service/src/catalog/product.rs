use serde::{Deserialize, Serialize};

use crate::errors::ServiceError;

/// Where a record's image came from. Only `Upload` images are owned by the
/// store and eligible for deletion.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ImageOrigin {
    Upload,
    /// Seed data or anything written by hand.
    #[default]
    External,
}

/// Name prefix of files written by the store.
pub const UPLOAD_FILE_PREFIX: &str = "imagen-";

impl ImageOrigin {
    /// Origin of an untagged `imagen` path: a generated file name means the
    /// store wrote it.
    pub fn infer(path: &str) -> Self {
        let file_name = path.rsplit('/').next().unwrap_or_default();
        if file_name.starts_with(UPLOAD_FILE_PREFIX) {
            ImageOrigin::Upload
        } else {
            ImageOrigin::External
        }
    }
}

/// Reference to an image file as stored in a record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageRef {
    pub path: String,
    pub origin: ImageOrigin,
}

impl ImageRef {
    pub fn upload(path: impl Into<String>) -> Self {
        Self { path: path.into(), origin: ImageOrigin::Upload }
    }

    pub fn external(path: impl Into<String>) -> Self {
        Self { path: path.into(), origin: ImageOrigin::External }
    }

    pub fn is_owned(&self) -> bool {
        self.origin == ImageOrigin::Upload
    }
}

/// One product record, serialized with the catalog's JSON keys.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "StoredProduct")]
pub struct Product {
    pub id: u64,
    pub nombre: String,
    pub precio: u64,
    pub imagen: String,
    pub alt: String,
    pub caracteristicas: Vec<String>,
    pub imagen_origen: ImageOrigin,
}

/// A record as found in the document. `imagen_origen` is missing from
/// documents written before the tag existed.
#[derive(Deserialize)]
struct StoredProduct {
    id: u64,
    nombre: String,
    precio: u64,
    #[serde(default)]
    imagen: String,
    #[serde(default)]
    alt: String,
    #[serde(default)]
    caracteristicas: Vec<String>,
    #[serde(default)]
    imagen_origen: Option<ImageOrigin>,
}

impl From<StoredProduct> for Product {
    fn from(stored: StoredProduct) -> Self {
        let imagen_origen = stored.imagen_origen.unwrap_or_else(|| ImageOrigin::infer(&stored.imagen));
        Self {
            id: stored.id,
            nombre: stored.nombre,
            precio: stored.precio,
            imagen: stored.imagen,
            alt: stored.alt,
            caracteristicas: stored.caracteristicas,
            imagen_origen,
        }
    }
}

impl Product {
    /// Current image, if the record has one.
    pub fn image(&self) -> Option<ImageRef> {
        if self.imagen.is_empty() {
            return None;
        }
        Some(ImageRef { path: self.imagen.clone(), origin: self.imagen_origen })
    }

    /// Swap in a new image, returning the one it replaces.
    pub fn replace_image(&mut self, image: ImageRef) -> Option<ImageRef> {
        let previous = self.image();
        self.imagen = image.path;
        self.imagen_origen = image.origin;
        previous
    }
}

/// `precio` as sent by a client: form text or a JSON number.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum PriceInput {
    Number(serde_json::Number),
    Text(String),
}

/// `caracteristicas` as sent by a client: comma-separated text or a JSON array.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum FeatureInput {
    Text(String),
    Items(Vec<String>),
}

impl FeatureInput {
    /// Trimmed, non-empty features in input order.
    pub fn into_features(self) -> Vec<String> {
        let items: Vec<String> = match self {
            FeatureInput::Text(text) => text.split(',').map(str::to_string).collect(),
            FeatureInput::Items(items) => items,
        };
        items
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// Raw field values from a create/update request, before any coercion.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ProductFields {
    #[serde(default)]
    pub nombre: Option<String>,
    #[serde(default)]
    pub precio: Option<PriceInput>,
    #[serde(default)]
    pub caracteristicas: Option<FeatureInput>,
    #[serde(default)]
    pub alt: Option<String>,
}

/// Validated input for a new record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewProduct {
    pub nombre: String,
    pub precio: u64,
    pub caracteristicas: Vec<String>,
    pub alt: Option<String>,
}

impl NewProduct {
    pub fn from_fields(fields: ProductFields) -> Result<Self, ServiceError> {
        let nombre = present(fields.nombre)
            .ok_or_else(|| ServiceError::Validation("nombre required".into()))?;
        let precio = match fields.precio {
            Some(raw) if !is_blank_price(&raw) => parse_price(&raw)?,
            _ => return Err(ServiceError::Validation("precio required".into())),
        };
        let caracteristicas = fields.caracteristicas.map(FeatureInput::into_features).unwrap_or_default();
        Ok(Self { nombre, precio, caracteristicas, alt: present(fields.alt) })
    }

    pub fn into_product(self, id: u64, image: ImageRef) -> Product {
        let alt = self.alt.unwrap_or_else(|| self.nombre.clone());
        Product {
            id,
            nombre: self.nombre,
            precio: self.precio,
            imagen: image.path,
            alt,
            caracteristicas: self.caracteristicas,
            imagen_origen: image.origin,
        }
    }
}

/// Field-level partial update: `None` keeps the stored value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProductPatch {
    pub nombre: Option<String>,
    pub precio: Option<u64>,
    pub caracteristicas: Option<Vec<String>>,
    pub alt: Option<String>,
}

impl ProductPatch {
    /// Blank text counts as absent, and so does a feature list that parses to
    /// nothing. A price of `0` is present.
    pub fn from_fields(fields: ProductFields) -> Result<Self, ServiceError> {
        let precio = match fields.precio {
            Some(raw) if !is_blank_price(&raw) => Some(parse_price(&raw)?),
            _ => None,
        };
        let caracteristicas = fields
            .caracteristicas
            .map(FeatureInput::into_features)
            .filter(|features| !features.is_empty());
        Ok(Self {
            nombre: present(fields.nombre),
            precio,
            caracteristicas,
            alt: present(fields.alt),
        })
    }

    pub fn apply(self, product: &mut Product) {
        match (self.alt, &self.nombre) {
            (Some(alt), _) => product.alt = alt,
            (None, Some(nombre)) => product.alt = nombre.clone(),
            (None, None) => {}
        }
        if let Some(nombre) = self.nombre {
            product.nombre = nombre;
        }
        if let Some(precio) = self.precio {
            product.precio = precio;
        }
        if let Some(caracteristicas) = self.caracteristicas {
            product.caracteristicas = caracteristicas;
        }
    }
}

fn present(value: Option<String>) -> Option<String> {
    value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn is_blank_price(raw: &PriceInput) -> bool {
    matches!(raw, PriceInput::Text(text) if text.trim().is_empty())
}

/// Integer price from client input. Text is read like `parseInt`: optional
/// leading whitespace and `+`, then digits; anything after the digits is ignored.
pub fn parse_price(raw: &PriceInput) -> Result<u64, ServiceError> {
    match raw {
        PriceInput::Number(n) => {
            if let Some(v) = n.as_u64() {
                return Ok(v);
            }
            match n.as_f64() {
                Some(f) if f.is_finite() && f >= 0.0 && f < u64::MAX as f64 => Ok(f.trunc() as u64),
                Some(f) if f < 0.0 => Err(ServiceError::Validation("precio must be non-negative".into())),
                _ => Err(ServiceError::Validation(format!("precio out of range: {n}"))),
            }
        }
        PriceInput::Text(text) => {
            let s = text.trim_start();
            if s.starts_with('-') {
                return Err(ServiceError::Validation("precio must be non-negative".into()));
            }
            let s = s.strip_prefix('+').unwrap_or(s);
            let digits = s.split(|c: char| !c.is_ascii_digit()).next().unwrap_or("");
            if digits.is_empty() {
                return Err(ServiceError::Validation(format!("precio is not a number: {text:?}")));
            }
            digits
                .parse::<u64>()
                .map_err(|_| ServiceError::Validation(format!("precio out of range: {text:?}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> PriceInput {
        PriceInput::Text(s.to_string())
    }

    fn fields(nombre: Option<&str>, precio: Option<&str>, caracteristicas: Option<&str>) -> ProductFields {
        ProductFields {
            nombre: nombre.map(str::to_string),
            precio: precio.map(text),
            caracteristicas: caracteristicas.map(|c| FeatureInput::Text(c.to_string())),
            alt: None,
        }
    }

    fn sample() -> Product {
        Product {
            id: 1,
            nombre: "Chair".into(),
            precio: 50,
            imagen: "assets/imagen-a.png".into(),
            alt: "Chair".into(),
            caracteristicas: vec!["wood".into(), "sturdy".into()],
            imagen_origen: ImageOrigin::Upload,
        }
    }

    #[test]
    fn price_text_reads_like_parse_int() {
        assert_eq!(parse_price(&text("50")).unwrap(), 50);
        assert_eq!(parse_price(&text("  42 ")).unwrap(), 42);
        assert_eq!(parse_price(&text("+7")).unwrap(), 7);
        assert_eq!(parse_price(&text("19.99")).unwrap(), 19);
        assert_eq!(parse_price(&text("12abc")).unwrap(), 12);
        assert_eq!(parse_price(&text("0")).unwrap(), 0);
        assert!(matches!(parse_price(&text("abc")), Err(ServiceError::Validation(_))));
        assert!(matches!(parse_price(&text("-5")), Err(ServiceError::Validation(_))));
        assert!(matches!(parse_price(&text("99999999999999999999999")), Err(ServiceError::Validation(_))));
    }

    #[test]
    fn price_numbers_from_json() {
        let v: ProductFields = serde_json::from_str(r#"{"precio": 30}"#).unwrap();
        assert_eq!(parse_price(v.precio.as_ref().unwrap()).unwrap(), 30);
        let v: ProductFields = serde_json::from_str(r#"{"precio": 30.9}"#).unwrap();
        assert_eq!(parse_price(v.precio.as_ref().unwrap()).unwrap(), 30);
        let v: ProductFields = serde_json::from_str(r#"{"precio": -1}"#).unwrap();
        assert!(parse_price(v.precio.as_ref().unwrap()).is_err());
        let v: ProductFields = serde_json::from_str(r#"{"precio": "15"}"#).unwrap();
        assert_eq!(v.precio, Some(text("15")));
    }

    #[test]
    fn features_are_split_trimmed_and_filtered() {
        let f = FeatureInput::Text("wood, sturdy ,, ".into()).into_features();
        assert_eq!(f, vec!["wood".to_string(), "sturdy".to_string()]);
        let f = FeatureInput::Items(vec![" a ".into(), "".into(), "b".into()]).into_features();
        assert_eq!(f, vec!["a".to_string(), "b".to_string()]);

        let v: ProductFields = serde_json::from_str(r#"{"caracteristicas": ["x", "y"]}"#).unwrap();
        assert_eq!(v.caracteristicas, Some(FeatureInput::Items(vec!["x".into(), "y".into()])));
    }

    #[test]
    fn new_product_defaults_alt_to_nombre() {
        let input = NewProduct::from_fields(fields(Some("Chair"), Some("50"), Some("wood, sturdy"))).unwrap();
        let p = input.into_product(1, ImageRef::upload("assets/imagen-x.png"));
        assert_eq!(p.alt, "Chair");
        assert_eq!(p.precio, 50);
        assert_eq!(p.caracteristicas, vec!["wood".to_string(), "sturdy".to_string()]);
        assert_eq!(p.imagen_origen, ImageOrigin::Upload);
    }

    #[test]
    fn new_product_requires_name_and_price() {
        assert!(matches!(
            NewProduct::from_fields(fields(None, Some("5"), None)),
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            NewProduct::from_fields(fields(Some("Lamp"), Some(" "), None)),
            Err(ServiceError::Validation(_))
        ));
        let ok = NewProduct::from_fields(fields(Some("Lamp"), Some("5"), None)).unwrap();
        assert!(ok.caracteristicas.is_empty());
    }

    #[test]
    fn patch_keeps_absent_fields() {
        let mut p = sample();
        ProductPatch::from_fields(fields(Some("Armchair"), Some(""), Some(" , ")))
            .unwrap()
            .apply(&mut p);
        assert_eq!(p.nombre, "Armchair");
        assert_eq!(p.alt, "Armchair");
        assert_eq!(p.precio, 50);
        assert_eq!(p.caracteristicas, vec!["wood".to_string(), "sturdy".to_string()]);
        assert_eq!(p.imagen, "assets/imagen-a.png");
    }

    #[test]
    fn patch_zero_price_is_present() {
        let mut p = sample();
        ProductPatch::from_fields(fields(None, Some("0"), None)).unwrap().apply(&mut p);
        assert_eq!(p.precio, 0);
        assert_eq!(p.nombre, "Chair");
    }

    #[test]
    fn patch_explicit_alt_wins() {
        let mut p = sample();
        let mut f = fields(Some("Armchair"), None, None);
        f.alt = Some("A comfy armchair".into());
        ProductPatch::from_fields(f).unwrap().apply(&mut p);
        assert_eq!(p.alt, "A comfy armchair");
        assert_eq!(p.nombre, "Armchair");
    }

    #[test]
    fn patch_rejects_non_numeric_price() {
        assert!(matches!(
            ProductPatch::from_fields(fields(None, Some("cheap"), None)),
            Err(ServiceError::Validation(_))
        ));
    }

    #[test]
    fn untagged_records_infer_origin_from_file_name() {
        let p: Product = serde_json::from_str(
            r#"{"id": 3, "nombre": "Desk", "precio": 120, "imagen": "assets/imagen-1700000000-42.jpg",
                "alt": "Desk", "caracteristicas": ["oak"]}"#,
        )
        .unwrap();
        assert_eq!(p.imagen_origen, ImageOrigin::Upload);
        assert!(p.image().unwrap().is_owned());

        let p: Product = serde_json::from_str(
            r#"{"id": 4, "nombre": "Lamp", "precio": 20, "imagen": "assets/lamp.jpg"}"#,
        )
        .unwrap();
        assert_eq!(p.imagen_origen, ImageOrigin::External);
        // the prefix must start the file name, not appear elsewhere in the path
        assert_eq!(ImageOrigin::infer("imagen-dir/seed.jpg"), ImageOrigin::External);
    }

    #[test]
    fn explicit_tag_wins_over_file_name() {
        let p: Product = serde_json::from_str(
            r#"{"id": 5, "nombre": "Rug", "precio": 80, "imagen": "assets/imagen-rug.jpg",
                "imagen_origen": "external"}"#,
        )
        .unwrap();
        assert_eq!(p.imagen_origen, ImageOrigin::External);

        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["imagen_origen"], "external");
    }

    #[test]
    fn replace_image_returns_previous() {
        let mut p = sample();
        let old = p.replace_image(ImageRef::upload("assets/imagen-b.png")).unwrap();
        assert_eq!(old.path, "assets/imagen-a.png");
        assert!(old.is_owned());
        assert_eq!(p.imagen, "assets/imagen-b.png");

        p.imagen.clear();
        assert!(p.replace_image(ImageRef::external("x.png")).is_none());
        assert_eq!(p.imagen_origen, ImageOrigin::External);
    }
}
