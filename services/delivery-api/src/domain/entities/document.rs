//! Document aggregate: a titled document plus its version history

use chrono::{DateTime, Utc};
use obra_common::{AuditInfo, DocumentId, DocumentVersionId, ProjectId, TenantId, UnitId, UserId};
use obra_domain_core::{AggregateRoot, Entity};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub tenant_id: TenantId,
    pub project_id: ProjectId,
    pub unit_id: Option<UnitId>,
    pub title: String,
    pub category: String,
    pub current_version: i32,
    pub audit_info: AuditInfo,
}

impl Document {
    pub fn new(
        tenant_id: TenantId,
        project_id: ProjectId,
        unit_id: Option<UnitId>,
        title: String,
        category: String,
    ) -> Self {
        Self {
            id: DocumentId::new(),
            tenant_id,
            project_id,
            unit_id,
            title,
            category,
            current_version: 0,
            audit_info: AuditInfo::default(),
        }
    }

    pub fn next_version(&self) -> i32 {
        self.current_version + 1
    }
}

impl Entity for Document {
    type Id = DocumentId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl AggregateRoot for Document {
    fn audit_info(&self) -> &AuditInfo {
        &self.audit_info
    }

    fn audit_info_mut(&mut self) -> &mut AuditInfo {
        &mut self.audit_info
    }
}

/// One stored revision of a document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentVersion {
    pub id: DocumentVersionId,
    pub document_id: DocumentId,
    pub version: i32,
    pub object_key: String,
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub uploaded_by: UserId,
    pub created_at: DateTime<Utc>,
}

impl DocumentVersion {
    pub fn new(
        document_id: DocumentId,
        version: i32,
        object_key: String,
        file_name: String,
        content_type: String,
        size_bytes: i64,
        uploaded_by: UserId,
    ) -> Self {
        Self {
            id: DocumentVersionId::new(),
            document_id,
            version,
            object_key,
            file_name,
            content_type,
            size_bytes,
            uploaded_by,
            created_at: Utc::now(),
        }
    }
}

/// Deterministic object key for a document revision
pub fn object_key(
    tenant_id: &TenantId,
    document_id: &DocumentId,
    version: i32,
    file_name: &str,
) -> String {
    format!(
        "tenant/{}/documents/{}/{}/{}",
        tenant_id, document_id, version, file_name
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_version_starts_at_one() {
        let doc = Document::new(
            TenantId::new(),
            ProjectId::new(),
            None,
            "Manual do proprietário".to_string(),
            "manual".to_string(),
        );
        assert_eq!(doc.current_version, 0);
        assert_eq!(doc.next_version(), 1);
    }

    #[test]
    fn test_object_key_layout() {
        let tenant_id = TenantId::new();
        let document_id = DocumentId::new();
        let key = object_key(&tenant_id, &document_id, 3, "planta.pdf");
        assert_eq!(
            key,
            format!("tenant/{}/documents/{}/3/planta.pdf", tenant_id, document_id)
        );
    }
}
