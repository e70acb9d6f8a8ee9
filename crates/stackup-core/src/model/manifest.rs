//! スタックマニフェスト
//!
//! サービス定義の集合と、compose 形式の YAML との相互変換を扱います。
//! 出力はサービスの宣言順を保ち、同じ入力からは常に同じバイト列になります。

use super::service::{BuildSource, RestartPolicy, ServiceDefinition};
use crate::error::{Result, StackError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

/// スタックマニフェスト
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackManifest {
    pub project: String,
    pub services: Vec<ServiceDefinition>,
    /// 名前付きの永続ボリューム
    pub volumes: Vec<String>,
}

impl StackManifest {
    pub fn service(&self, name: &str) -> Option<&ServiceDefinition> {
        self.services.iter().find(|s| s.name == name)
    }

    pub fn service_names(&self) -> Vec<String> {
        self.services.iter().map(|s| s.name.clone()).collect()
    }

    /// 重複・未定義の依存・循環依存を検出
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for service in &self.services {
            if !seen.insert(service.name.as_str()) {
                return Err(StackError::DuplicateService(service.name.clone()));
            }
        }

        for service in &self.services {
            for dep in &service.depends_on {
                if !seen.contains(dep.as_str()) {
                    return Err(StackError::DanglingDependency {
                        service: service.name.clone(),
                        dependency: dep.clone(),
                    });
                }
            }
        }

        self.startup_order().map(|_| ())
    }

    /// 依存関係に従った起動順（同順位は宣言順）
    pub fn startup_order(&self) -> Result<Vec<String>> {
        let index: HashMap<&str, usize> = self
            .services
            .iter()
            .enumerate()
            .map(|(i, s)| (s.name.as_str(), i))
            .collect();

        let mut in_degree = vec![0usize; self.services.len()];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); self.services.len()];

        for (i, service) in self.services.iter().enumerate() {
            for dep in &service.depends_on {
                let Some(&d) = index.get(dep.as_str()) else {
                    return Err(StackError::DanglingDependency {
                        service: service.name.clone(),
                        dependency: dep.clone(),
                    });
                };
                in_degree[i] += 1;
                dependents[d].push(i);
            }
        }

        let mut order = Vec::with_capacity(self.services.len());
        let mut done = vec![false; self.services.len()];

        while order.len() < self.services.len() {
            // 宣言順で最初に準備できたものを選ぶ
            let Some(next) = (0..self.services.len()).find(|&i| !done[i] && in_degree[i] == 0)
            else {
                let cycle: Vec<&str> = self
                    .services
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| !done[*i])
                    .map(|(_, s)| s.name.as_str())
                    .collect();
                return Err(StackError::CircularDependency(cycle.join(" -> ")));
            };

            done[next] = true;
            order.push(self.services[next].name.clone());
            for &dependent in &dependents[next] {
                in_degree[dependent] -= 1;
            }
        }

        Ok(order)
    }

    /// compose 形式の YAML に変換
    pub fn to_yaml(&self) -> Result<String> {
        let compose = ComposeFile::from(self);
        Ok(serde_yaml::to_string(&compose)?)
    }

    /// compose 形式の YAML から読み込み、検証する
    pub fn from_yaml(content: &str) -> Result<Self> {
        let compose: ComposeFile = serde_yaml::from_str(content)?;
        let manifest = StackManifest::from(compose);
        manifest.validate()?;
        Ok(manifest)
    }

    #[tracing::instrument]
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| StackError::io(path, e))?;
        Self::from_yaml(&content)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ComposeFile {
    name: String,
    #[serde(with = "ordered_map")]
    services: Vec<(String, ComposeService)>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    volumes: BTreeMap<String, ComposeVolume>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ComposeService {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    build: Option<ComposeBuild>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    container_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    entrypoint: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    depends_on: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    env_file: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    volumes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    ports: Vec<String>,
    #[serde(default, skip_serializing_if = "is_no_restart")]
    restart: RestartPolicy,
}

fn is_no_restart(policy: &RestartPolicy) -> bool {
    *policy == RestartPolicy::No
}

#[derive(Debug, Serialize, Deserialize)]
struct ComposeBuild {
    context: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ComposeVolume {}

impl From<&StackManifest> for ComposeFile {
    fn from(manifest: &StackManifest) -> Self {
        let services = manifest
            .services
            .iter()
            .map(|s| {
                let (image, build) = match &s.source {
                    BuildSource::Image(image) => (Some(image.clone()), None),
                    BuildSource::Build { context, tag } => (
                        Some(tag.clone()),
                        Some(ComposeBuild {
                            context: context.clone(),
                        }),
                    ),
                };
                let service = ComposeService {
                    image,
                    build,
                    container_name: s.container_name.clone(),
                    entrypoint: s.entrypoint.clone(),
                    depends_on: s.depends_on.clone(),
                    env_file: s.env_files.clone(),
                    volumes: s.volumes.clone(),
                    ports: s.ports.clone(),
                    restart: s.restart,
                };
                (s.name.clone(), service)
            })
            .collect();

        Self {
            name: manifest.project.clone(),
            services,
            volumes: manifest
                .volumes
                .iter()
                .map(|v| (v.clone(), ComposeVolume::default()))
                .collect(),
        }
    }
}

impl From<ComposeFile> for StackManifest {
    fn from(compose: ComposeFile) -> Self {
        let services = compose
            .services
            .into_iter()
            .map(|(name, s)| {
                let source = match (s.build, s.image) {
                    (Some(build), tag) => BuildSource::Build {
                        tag: tag.unwrap_or_else(|| format!("{}-{}", compose.name, name)),
                        context: build.context,
                    },
                    (None, image) => BuildSource::Image(image.unwrap_or_default()),
                };
                ServiceDefinition {
                    name,
                    source,
                    container_name: s.container_name,
                    depends_on: s.depends_on,
                    volumes: s.volumes,
                    ports: s.ports,
                    env_files: s.env_file,
                    entrypoint: s.entrypoint,
                    restart: s.restart,
                }
            })
            .collect();

        Self {
            project: compose.name,
            services,
            volumes: compose.volumes.into_keys().collect(),
        }
    }
}

/// 宣言順を保ったまま `Vec<(String, V)>` を YAML のマップとして扱う
mod ordered_map {
    use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
    use serde::ser::{Serialize, Serializer};
    use std::fmt;
    use std::marker::PhantomData;

    pub fn serialize<S, V>(entries: &[(String, V)], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        V: Serialize,
    {
        serializer.collect_map(entries.iter().map(|(k, v)| (k, v)))
    }

    pub fn deserialize<'de, D, V>(deserializer: D) -> Result<Vec<(String, V)>, D::Error>
    where
        D: Deserializer<'de>,
        V: Deserialize<'de>,
    {
        struct OrderedVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedVisitor<V> {
            type Value = Vec<(String, V)>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of services")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, value)) = map.next_entry::<String, V>()? {
                    entries.push((key, value));
                }
                Ok(entries)
            }
        }

        deserializer.deserialize_map(OrderedVisitor(PhantomData))
    }
}
