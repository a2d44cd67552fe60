//! [`RemoteDataSource`] implementations over the REST API.

use crate::api_client::{ApiClientError, RestClient};
use crate::wire::{review_body, step_body, ContentReviewDto, NamedDto, ReviewPageDto, StepDto};
use async_trait::async_trait;
use backoffice_core::{
    paginate_locally, ContentReview, DataSourceError, FieldMap, Lookups, Page, PageQuery,
    RecordId, RemoteDataSource, Step,
};

/// `/steps`. The server returns whole collections, so paging happens here.
///
/// A `workflow_id` filter selects `/steps/by-workflow/{id}`; `agent_id` is
/// applied to the returned rows.
#[derive(Debug, Clone)]
pub struct StepsSource {
    client: RestClient,
}

impl StepsSource {
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }

    /// Canonical copy of one step, read back from the collection.
    async fn read_back(&self, id: RecordId) -> Result<Step, DataSourceError> {
        let dtos: Option<Vec<StepDto>> = self.client.get_json::<_, ()>("/steps", None).await?;
        dtos.unwrap_or_default()
            .into_iter()
            .find(|dto| dto.id == id)
            .map(Step::from)
            .ok_or_else(|| DataSourceError::parse(format!("step {} missing after update", id)))
    }
}

fn filter_id(query: &PageQuery, name: &str) -> Result<Option<RecordId>, DataSourceError> {
    query
        .criteria
        .get(name)
        .map(|raw| {
            raw.parse::<RecordId>()
                .map_err(|_| DataSourceError::validation(format!("{} must be an integer", name)))
        })
        .transpose()
}

#[async_trait]
impl RemoteDataSource for StepsSource {
    type Record = Step;

    async fn fetch_page(&self, query: &PageQuery) -> Result<Page<Step>, DataSourceError> {
        let path = match filter_id(query, "workflow_id")? {
            Some(workflow_id) => format!("/steps/by-workflow/{}", workflow_id),
            None => "/steps".to_string(),
        };
        let dtos: Option<Vec<StepDto>> = self.client.get_json::<_, ()>(&path, None).await?;
        let mut steps: Vec<Step> = dtos.unwrap_or_default().into_iter().map(Step::from).collect();
        if let Some(agent_id) = filter_id(query, "agent_id")? {
            steps.retain(|step| step.agent_id == Some(agent_id));
        }
        tracing::debug!(path = %path, total = steps.len(), page = query.page, "steps fetched");
        Ok(paginate_locally(&steps, query))
    }

    async fn create_record(&self, payload: &FieldMap) -> Result<Step, DataSourceError> {
        let dto: StepDto = self.client.post_json("/steps", &step_body(None, payload)).await?;
        Ok(dto.into())
    }

    async fn update_record(&self, id: RecordId, patch: &FieldMap) -> Result<Step, DataSourceError> {
        let path = format!("/steps/{}", id);
        let echoed: Option<StepDto> = self.client.put_json(&path, &step_body(Some(id), patch)).await?;
        match echoed {
            Some(dto) => Ok(dto.into()),
            None => {
                tracing::debug!(id, "step update returned no body, reading it back");
                self.read_back(id).await
            }
        }
    }

    async fn delete_record(&self, id: RecordId) -> Result<(), DataSourceError> {
        self.client.delete(&format!("/steps/{}", id)).await?;
        Ok(())
    }
}

/// `/content-reviews`, paged and filtered by the server.
#[derive(Debug, Clone)]
pub struct ContentReviewSource {
    client: RestClient,
}

impl ContentReviewSource {
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RemoteDataSource for ContentReviewSource {
    type Record = ContentReview;

    async fn fetch_page(&self, query: &PageQuery) -> Result<Page<ContentReview>, DataSourceError> {
        let mut params: Vec<(String, String)> = vec![
            ("page".to_string(), query.page.to_string()),
            ("limit".to_string(), query.limit.to_string()),
        ];
        params.extend(
            query
                .criteria
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string())),
        );
        let page: ReviewPageDto = self.client.get_json("/content-reviews", Some(&params)).await?;
        let total_pages = page.total_pages();
        Ok(Page {
            records: page.data.into_iter().map(ContentReview::from).collect(),
            total_pages,
        })
    }

    async fn create_record(&self, _payload: &FieldMap) -> Result<ContentReview, DataSourceError> {
        Err(DataSourceError::validation("Content reviews cannot be created here"))
    }

    async fn update_record(
        &self,
        id: RecordId,
        patch: &FieldMap,
    ) -> Result<ContentReview, DataSourceError> {
        let path = format!("/content-reviews/{}", id);
        let echoed: Option<ContentReviewDto> = self.client.put_json(&path, &review_body(patch)).await?;
        echoed
            .map(ContentReview::from)
            .ok_or_else(|| DataSourceError::parse("update returned no record"))
    }

    async fn delete_record(&self, id: RecordId) -> Result<(), DataSourceError> {
        self.client.delete(&format!("/content-reviews/{}", id)).await?;
        Ok(())
    }
}

/// Agents and workflows for foreign-key display and selection.
pub async fn load_lookups(client: &RestClient) -> Result<Lookups, ApiClientError> {
    let agents: Option<Vec<NamedDto>> = client.get_json::<_, ()>("/agents", None).await?;
    let workflows: Option<Vec<NamedDto>> = client.get_json::<_, ()>("/workflows", None).await?;
    Ok(Lookups {
        agents: agents.unwrap_or_default().into_iter().map(Into::into).collect(),
        workflows: workflows.unwrap_or_default().into_iter().map(Into::into).collect(),
    })
}
