//! Static catalog of documentation pages the selector may pick from.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

/// A titled documentation page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    pub title: String,
    pub url: String,
}

impl DocumentRef {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
        }
    }
}

const ROBBU_DOCS: &[(&str, &str)] = &[
    ("Templates WhatsApp", "https://docs.robbu.global/docs/center/como-criar-templates-whatsapp"),
    ("Edição de Tags (Live)", "https://docs.robbu.global/docs/live/edicao-de-tags"),
    ("Configurações Gerais da Conta", "https://robbu.mintlify.app/docs/center/configuracoes-gerais-da%20conta"),
    ("Gerenciar Host de Acesso", "https://docs.robbu.global/docs/center/gerenciar-host-de-acesso#o-que-e-o-gerenciar-hosts-de-acesso"),
    ("Como Criar Agendamento (Live)", "https://docs.robbu.global/docs/live/como-criar-agendamento"),
    ("Carteiro Digital API", "https://docs.robbu.global/docs/carteiro-digital/carteiro-digital-api"),
    ("Carteiro Digital", "https://docs.robbu.global/docs/carteiro-digital/carteiro-digital"),
    ("Gestão de Frases Prontas", "https://docs.robbu.global/docs/center/gestao-frases-prontas"),
    ("Restrições", "https://docs.robbu.global/docs/center/restricoes"),
    ("Campanhas: Público e Importação", "https://docs.robbu.global/docs/center/campanhas-publico-importacao"),
    ("Criando Campanha SMS", "https://docs.robbu.global/docs/center/criando-campanha-sms"),
    ("Bibliotecas de Mídias", "https://docs.robbu.global/docs/center/bibliotecas-de-midias"),
    ("Criar Campanhas de WhatsApp", "https://docs.robbu.global/docs/center/campanhas-de-whatsapp"),
    ("Canais de Atendimento", "https://docs.robbu.global/docs/center/canais-atendimento"),
    ("Canal WhatsApp", "https://docs.robbu.global/docs/center/canal-whatsapp"),
    ("Como Alterar Imagem da Linha WhatsApp", "https://robbu.mintlify.app/docs/center/como-alterar-imagem-da-linha-whatsapp"),
    ("Criação de Contatos Invenio Center", "https://robbu.mintlify.app/docs/center/criacao-de-contatos-invenio-center"),
    ("Exportação de Conversas (Live)", "https://robbu.mintlify.app/docs/live/exportacao-de-conversas"),
    ("Fila de Atendimento", "https://robbu.mintlify.app/docs/center/fila-de-atendimento"),
    ("Filtros de Busca de Contatos", "https://robbu.mintlify.app/docs/center/filtros-de-busca-de-contatos"),
    ("Lista de Desejos (Live)", "https://robbu.mintlify.app/docs/live/lista-de-desejos"),
    ("Métodos de Distribuição (Live)", "https://docs.robbu.global/docs/live/metodos-de-distribuicao"),
    ("Sessão de 24 Horas no WhatsApp", "https://robbu.mintlify.app/docs/live/sessao-de-24horas-no-whatsapp"),
    ("Usuários", "https://docs.robbu.global/docs/center/usuarios"),
    ("Relatórios", "https://docs.robbu.global/docs/center/relatorios"),
    ("Webchat", "https://docs.robbu.global/docs/center/web-chat"),
    ("KPI Eventos", "https://docs.robbu.global/docs/center/dashboard-kpi-eventos"),
    ("Privacidade e LGPD", "https://docs.robbu.global/docs/center/privacidade-e-protecao"),
];

const META_DOCS: &[(&str, &str)] = &[
    ("Códigos de Erro da API", "https://developers.facebook.com/docs/whatsapp/cloud-api/support/error-codes/?locale=pt_BR"),
    ("Migração de On-Premises para a Nuvem", "https://developers.facebook.com/docs/whatsapp/cloud-api/guides/migrating-from-onprem-to-cloud?locale=pt_BR"),
    ("Contas Comerciais do WhatsApp", "https://developers.facebook.com/docs/whatsapp/overview/business-accounts"),
    ("Números de Telefone (Cloud API)", "https://developers.facebook.com/docs/whatsapp/cloud-api/phone-numbers"),
    ("Configuração de Webhooks", "https://developers.facebook.com/docs/whatsapp/cloud-api/webhooks"),
    ("Documentação da API do WhatsApp", "https://developers.facebook.com/docs/whatsapp/cloud-api/"),
    ("Política de Privacidade do WhatsApp", "https://www.whatsapp.com/legal/privacy-policy?lang=pt_BR"),
    ("Política de Uso da API do WhatsApp", "https://www.whatsapp.com/legal/business-policy?lang=pt_BR"),
];

/// Ordered, read-only list of [`DocumentRef`]s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    documents: Vec<DocumentRef>,
}

impl Catalog {
    /// Robbu product pages followed by the Meta WhatsApp pages.
    pub fn builtin() -> Self {
        let documents = ROBBU_DOCS
            .iter()
            .chain(META_DOCS)
            .map(|(title, url)| DocumentRef::new(*title, *url))
            .collect();
        Self { documents }
    }

    pub fn new(documents: Vec<DocumentRef>) -> Self {
        Self { documents }
    }

    /// Appends entries, skipping URLs already present.
    pub fn extended(mut self, extra: impl IntoIterator<Item = DocumentRef>) -> Self {
        for document in extra {
            if !self.contains_url(&document.url) {
                self.documents.push(document);
            }
        }
        self
    }

    pub fn documents(&self) -> &[DocumentRef] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn contains_url(&self, url: &str) -> bool {
        self.documents.iter().any(|document| document.url == url)
    }

    /// Numbered listing used inside the selector prompt.
    pub fn render_numbered(&self) -> String {
        let mut out = String::new();
        for (index, document) in self.documents.iter().enumerate() {
            let _ = writeln!(
                out,
                "{}. Título do Documento: '{}', URL: {}",
                index + 1,
                document.title,
                document.url
            );
        }
        out
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}
