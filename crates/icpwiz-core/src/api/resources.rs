//! Product, persona and segment CRUD under `/api/workspaces/:slug/{kind}`

use super::{ApiClient, ApiResult};
use icpwiz_types::{Persona, Product, Segment};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Products,
    Personas,
    Segments,
}

impl ResourceKind {
    pub fn as_path(&self) -> &'static str {
        match self {
            ResourceKind::Products => "products",
            ResourceKind::Personas => "personas",
            ResourceKind::Segments => "segments",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_path())
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "products" | "product" => Ok(ResourceKind::Products),
            "personas" | "persona" => Ok(ResourceKind::Personas),
            "segments" | "segment" => Ok(ResourceKind::Segments),
            other => Err(format!("unknown resource '{}'", other)),
        }
    }
}

impl ApiClient {
    pub async fn list_resources<T: DeserializeOwned>(
        &self,
        slug: &str,
        kind: ResourceKind,
    ) -> ApiResult<Vec<T>> {
        self.send(self.get(&["api", "workspaces", slug, kind.as_path()]))
            .await
    }

    pub async fn create_resource<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        slug: &str,
        kind: ResourceKind,
        body: &B,
    ) -> ApiResult<T> {
        let request = self
            .post(&["api", "workspaces", slug, kind.as_path()])
            .json(body);
        self.send(request).await
    }

    pub async fn update_resource<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        slug: &str,
        kind: ResourceKind,
        id: &str,
        body: &B,
    ) -> ApiResult<T> {
        let request = self
            .put(&["api", "workspaces", slug, kind.as_path(), id])
            .json(body);
        self.send(request).await
    }

    pub async fn delete_resource(&self, slug: &str, kind: ResourceKind, id: &str) -> ApiResult<()> {
        self.send_empty(self.delete(&["api", "workspaces", slug, kind.as_path(), id]))
            .await
    }

    pub async fn list_products(&self, slug: &str) -> ApiResult<Vec<Product>> {
        self.list_resources(slug, ResourceKind::Products).await
    }

    pub async fn list_personas(&self, slug: &str) -> ApiResult<Vec<Persona>> {
        self.list_resources(slug, ResourceKind::Personas).await
    }

    pub async fn list_segments(&self, slug: &str) -> ApiResult<Vec<Segment>> {
        self.list_resources(slug, ResourceKind::Segments).await
    }

    pub async fn create_segment(&self, slug: &str, segment: &Segment) -> ApiResult<Segment> {
        self.create_resource(slug, ResourceKind::Segments, segment)
            .await
    }

    pub async fn update_segment(
        &self,
        slug: &str,
        id: &str,
        segment: &Segment,
    ) -> ApiResult<Segment> {
        self.update_resource(slug, ResourceKind::Segments, id, segment)
            .await
    }

    pub async fn create_persona(&self, slug: &str, persona: &Persona) -> ApiResult<Persona> {
        self.create_resource(slug, ResourceKind::Personas, persona)
            .await
    }

    pub async fn update_persona(
        &self,
        slug: &str,
        id: &str,
        persona: &Persona,
    ) -> ApiResult<Persona> {
        self.update_resource(slug, ResourceKind::Personas, id, persona)
            .await
    }

    pub async fn create_product(&self, slug: &str, product: &Product) -> ApiResult<Product> {
        self.create_resource(slug, ResourceKind::Products, product)
            .await
    }

    pub async fn update_product(
        &self,
        slug: &str,
        id: &str,
        product: &Product,
    ) -> ApiResult<Product> {
        self.update_resource(slug, ResourceKind::Products, id, product)
            .await
    }
}
