use delivery_api::domain::entities::{object_key, Document, DocumentVersion, Project, Tenant};
use delivery_api::domain::repositories::{
    DocumentRepository, ProjectRepository, TenantRepository,
};
use delivery_api::infrastructure::persistence::{
    PostgresDocumentRepository, PostgresProjectRepository, PostgresTenantRepository,
};
use obra_common::UserId;
use obra_errors::AppError;
use sqlx::PgPool;

async fn seed_document(pool: &PgPool) -> (PostgresDocumentRepository, Document) {
    let tenants = PostgresTenantRepository::new(pool.clone());
    let projects = PostgresProjectRepository::new(pool.clone());
    let documents = PostgresDocumentRepository::new(pool.clone());

    let tenant = Tenant::new("Construtora Alfa".to_string(), "alfa".to_string());
    tenants.create(&tenant).await.unwrap();

    let project = Project::new(tenant.id, "Residencial Aurora".to_string());
    projects.create(&project).await.unwrap();

    let document = Document::new(
        tenant.id,
        project.id,
        None,
        "Manual do proprietário".to_string(),
        "MANUAL".to_string(),
    );
    documents.create(&document).await.unwrap();

    (documents, document)
}

fn version_row(document: &Document, version: i32, uploaded_by: UserId) -> DocumentVersion {
    let key = object_key(&document.tenant_id, &document.id, version, "manual.pdf");
    DocumentVersion::new(
        document.id,
        version,
        key,
        "manual.pdf".to_string(),
        "application/pdf".to_string(),
        1024,
        uploaded_by,
    )
}

#[sqlx::test(migrations = "./migrations")]
async fn test_add_version_increments_current_version(pool: PgPool) {
    let (documents, document) = seed_document(&pool).await;
    let uploader = UserId::new();

    documents
        .add_version(&version_row(&document, 1, uploader))
        .await
        .unwrap();
    documents
        .add_version(&version_row(&document, 2, uploader))
        .await
        .unwrap();

    let stored = documents.find_by_id(&document.id).await.unwrap().unwrap();
    assert_eq!(stored.current_version, 2);

    let versions = documents.list_versions(&document.id).await.unwrap();
    assert_eq!(versions.len(), 2);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_stale_version_is_rejected_atomically(pool: PgPool) {
    let (documents, document) = seed_document(&pool).await;
    let uploader = UserId::new();

    documents
        .add_version(&version_row(&document, 1, uploader))
        .await
        .unwrap();

    // a second writer racing with the same version number must lose
    let err = documents
        .add_version(&version_row(&document, 1, uploader))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let stored = documents.find_by_id(&document.id).await.unwrap().unwrap();
    assert_eq!(stored.current_version, 1);
    assert_eq!(documents.list_versions(&document.id).await.unwrap().len(), 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_find_version_returns_requested_revision(pool: PgPool) {
    let (documents, document) = seed_document(&pool).await;
    let uploader = UserId::new();

    documents
        .add_version(&version_row(&document, 1, uploader))
        .await
        .unwrap();
    documents
        .add_version(&version_row(&document, 2, uploader))
        .await
        .unwrap();

    let first = documents
        .find_version(&document.id, 1)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(first.version, 1);
    assert_eq!(
        first.object_key,
        object_key(&document.tenant_id, &document.id, 1, "manual.pdf")
    );

    assert!(documents.find_version(&document.id, 9).await.unwrap().is_none());
}
